use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use darkest_hour_core::Coordinate;
use log::error;
use observer::{derive, ObservingConditions};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{api_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl WeatherQuery {
    fn coordinate(&self) -> Result<Coordinate, ApiError> {
        let (Some(lat), Some(lng)) = (non_blank(&self.lat), non_blank(&self.lng)) else {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Missing lat or lng parameters",
            ));
        };
        let coord = match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Coordinate::checked(lng, lat),
            _ => None,
        };
        coord.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Invalid lat or lng parameters"))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Handler for current observing conditions (GET /api/weather?lat=&lng=)
pub async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<ObservingConditions>, ApiError> {
    let coord = query.coordinate()?;

    let raw = state.forecasts.fetch(coord).await.map_err(|err| {
        error!(
            "error fetching forecast for {} ({}): {}",
            coord,
            err.kind(),
            err
        );
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch weather data",
        )
    })?;

    Ok(Json(derive(&raw, OffsetDateTime::now_utc())))
}
