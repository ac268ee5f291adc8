mod geolocation;
mod nominatim;

pub use geolocation::*;
pub use nominatim::*;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use serde::Serialize;

use crate::FetchError;

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub label: String,
    pub center: Coordinate,
    pub category: Option<String>,
}

/// Free-text place search; callers never pass a blank query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError>;
}

/// Best-effort "where is the user" lookup
///
/// Single attempt, bounded in time; every failure resolves to `None`.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn lookup(&self) -> Option<Coordinate>;
}
