mod open_meteo;

pub use open_meteo::*;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use time::{OffsetDateTime, UtcOffset};

use crate::FetchError;

/// Forecast payload for one location, as the provider reported it
///
/// Only lives for the duration of a single derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub current_temperature_c: f64,
    pub cloud_cover_pct: u8,
    pub visibility_m: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub sunrise: Option<OffsetDateTime>,
    pub sunset: Option<OffsetDateTime>,
    /// Jet stream band, one sample per local hour starting at midnight
    pub hourly_wind_high_altitude: Option<Vec<Option<f64>>>,
    /// Surface band, same indexing
    pub hourly_wind_low_altitude: Vec<Option<f64>>,
    /// Offset of the location's local time, used to index the hourly series
    pub utc_offset: UtcOffset,
}

impl Default for RawForecast {
    fn default() -> Self {
        Self {
            current_temperature_c: 0.0,
            cloud_cover_pct: 0,
            visibility_m: None,
            humidity_pct: None,
            sunrise: None,
            sunset: None,
            hourly_wind_high_altitude: None,
            hourly_wind_low_altitude: Vec::new(),
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Single-attempt retrieval of raw forecast data; retry policy belongs to the caller
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, coord: Coordinate) -> Result<RawForecast, FetchError>;
}
