use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use darkest_hour_core::Coordinate;
use log::{debug, error};
use observer::{FetchError, Place};
use serde::{Deserialize, Serialize};

use crate::{api_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search hit in the feature shape map widgets expect
#[derive(Debug, Serialize)]
pub struct PlaceFeature {
    pub id: String,
    pub place_name: String,
    /// `[lng, lat]`
    pub center: Coordinate,
    pub properties: FeatureProperties,
}

#[derive(Debug, Serialize)]
pub struct FeatureProperties {
    pub address: String,
    pub category: Option<String>,
}

impl From<Place> for PlaceFeature {
    fn from(place: Place) -> Self {
        PlaceFeature {
            id: place.id,
            place_name: place.label.clone(),
            center: place.center,
            properties: FeatureProperties {
                address: place.label,
                category: place.category,
            },
        }
    }
}

/// Handler for place search (GET /api/search?q=)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PlaceFeature>>, ApiError> {
    let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Query parameter 'q' is required",
        ));
    };

    let places = state.places.search(q).await.map_err(|err| {
        error!("error searching places for {:?} ({}): {}", q, err.kind(), err);
        search_error(&err)
    })?;
    debug!("search {:?} matched {} places", q, places.len());

    Ok(Json(places.into_iter().map(PlaceFeature::from).collect()))
}

/// Provider status codes pass through, anything else is our failure
fn search_error(err: &FetchError) -> ApiError {
    match err {
        FetchError::Status(code) => {
            let status = StatusCode::from_u16(*code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            api_error(status, "Failed to fetch geocoding results")
        }
        FetchError::Upstream(_) | FetchError::Malformed(_) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
