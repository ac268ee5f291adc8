use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::AppState;

const UNKNOWN: &str = "Unknown";

/// Where the request came from, as reported by the edge proxy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub timezone: Option<String>,
    pub flag: Option<String>,
}

impl GeoInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        GeoInfo {
            country: header("x-vercel-ip-country").unwrap_or_else(|| UNKNOWN.to_string()),
            region: header("x-vercel-ip-country-region").unwrap_or_else(|| UNKNOWN.to_string()),
            city: header("x-vercel-ip-city").unwrap_or_else(|| UNKNOWN.to_string()),
            latitude: header("x-vercel-ip-latitude"),
            longitude: header("x-vercel-ip-longitude"),
            timezone: header("x-vercel-ip-timezone"),
            flag: header("x-vercel-ip-country-flag"),
        }
    }

    /// Fixed answer for local development, where no proxy headers exist
    pub fn development() -> Self {
        GeoInfo {
            country: "United States".to_string(),
            region: "CA".to_string(),
            city: "San Francisco".to_string(),
            latitude: Some("37.7749".to_string()),
            longitude: Some("-122.4194".to_string()),
            timezone: Some("America/Los_Angeles".to_string()),
            flag: Some("🇺🇸".to_string()),
        }
    }
}

/// Handler for request geolocation (GET /api/geo)
pub async fn geo(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<GeoInfo> {
    if state.dev_geo {
        Json(GeoInfo::development())
    } else {
        Json(GeoInfo::from_headers(&headers))
    }
}
