mod derive;
mod moon;
mod report;

pub use derive::*;
pub use moon::*;
pub use report::*;

use serde::Serialize;

/// Coarse quality grade for seeing and transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Excellent,
    Average,
    Poor,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Grade::Excellent => "Excellent",
            Grade::Average => "Average",
            Grade::Poor => "Poor",
        };
        write!(f, "{}", label)
    }
}

/// Which hourly wind series produced the seeing estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSource {
    /// 250 hPa, jet stream
    HighAltitude,
    /// 10 m, surface
    LowAltitude,
    /// Neither series had a sample for the current hour
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Astronomy {
    /// `[0, 1)`, 0 new moon, 0.5 full moon
    pub moon_phase: f64,
    pub seeing: Grade,
    pub transparency: Grade,
    #[serde(rename = "jetStreamSpeed")]
    pub high_altitude_wind_speed: f64,
    pub wind_source: WindSource,
}

/// Graded observing conditions, fully determined by a forecast and an instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservingConditions {
    #[serde(rename = "temperature")]
    pub temperature_c: f64,
    #[serde(rename = "cloudCover")]
    pub cloud_cover_pct: u8,
    #[serde(rename = "visibility")]
    pub visibility_m: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: u8,
    /// Linear approximation, see [`approximate_dew_point`]
    #[serde(rename = "dewPoint")]
    pub dew_point_c: f64,
    #[serde(rename = "isDay")]
    pub is_daytime: bool,
    pub astronomy: Astronomy,
}
