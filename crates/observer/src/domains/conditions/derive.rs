use time::OffsetDateTime;

use crate::{moon_phase, Astronomy, Grade, ObservingConditions, RawForecast, WindSource};

/// Used when the provider omits relative humidity
pub const DEFAULT_HUMIDITY_PCT: u8 = 50;
/// Used when the provider omits visibility
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

// Seeing thresholds in km/h. The jet stream band runs much faster than the
// surface band, so each has its own cut-offs.
const JET_STREAM_EXCELLENT_BELOW: f64 = 72.0;
const JET_STREAM_POOR_ABOVE: f64 = 144.0;
const SURFACE_EXCELLENT_BELOW: f64 = 20.0;
const SURFACE_POOR_ABOVE: f64 = 40.0;

/// Derive graded observing conditions from a raw forecast at instant `now`
///
/// Pure: identical inputs give identical output, and no well-formed
/// forecast makes it fail. Absent optional fields fall back to
/// [`DEFAULT_HUMIDITY_PCT`], [`DEFAULT_VISIBILITY_M`], daytime, and a wind
/// speed of zero.
pub fn derive(raw: &RawForecast, now: OffsetDateTime) -> ObservingConditions {
    let humidity_pct = raw.humidity_pct.unwrap_or(DEFAULT_HUMIDITY_PCT);
    let visibility_m = raw.visibility_m.unwrap_or(DEFAULT_VISIBILITY_M);
    let (wind_speed, wind_source) = select_wind(raw, now);

    ObservingConditions {
        temperature_c: raw.current_temperature_c,
        cloud_cover_pct: raw.cloud_cover_pct,
        visibility_m,
        humidity_pct,
        dew_point_c: approximate_dew_point(raw.current_temperature_c, humidity_pct),
        is_daytime: is_daytime(raw, now),
        astronomy: Astronomy {
            moon_phase: moon_phase(now),
            seeing: grade_seeing(wind_speed, wind_source),
            transparency: grade_transparency(humidity_pct, visibility_m),
            high_altitude_wind_speed: wind_speed,
            wind_source,
        },
    }
}

/// `sunrise <= now <= sunset`, daytime when either bound is unknown
pub fn is_daytime(raw: &RawForecast, now: OffsetDateTime) -> bool {
    match (raw.sunrise, raw.sunset) {
        (Some(sunrise), Some(sunset)) => sunrise <= now && now <= sunset,
        _ => true,
    }
}

/// Pick the wind sample for the location's current hour, jet stream first
pub fn select_wind(raw: &RawForecast, now: OffsetDateTime) -> (f64, WindSource) {
    let hour = usize::from(now.to_offset(raw.utc_offset).hour());
    let sample = |series: &[Option<f64>]| series.get(hour).copied().flatten();

    if let Some(speed) = raw.hourly_wind_high_altitude.as_deref().and_then(sample) {
        return (speed, WindSource::HighAltitude);
    }
    if let Some(speed) = sample(&raw.hourly_wind_low_altitude) {
        return (speed, WindSource::LowAltitude);
    }
    (0.0, WindSource::Unavailable)
}

/// Strict `<` / `>` on both bounds; a speed exactly on a bound is Average
pub fn grade_seeing(wind_speed: f64, source: WindSource) -> Grade {
    let (excellent_below, poor_above) = match source {
        WindSource::HighAltitude => (JET_STREAM_EXCELLENT_BELOW, JET_STREAM_POOR_ABOVE),
        WindSource::LowAltitude | WindSource::Unavailable => {
            (SURFACE_EXCELLENT_BELOW, SURFACE_POOR_ABOVE)
        }
    };

    if wind_speed < excellent_below {
        Grade::Excellent
    } else if wind_speed > poor_above {
        Grade::Poor
    } else {
        Grade::Average
    }
}

pub fn grade_transparency(humidity_pct: u8, visibility_m: f64) -> Grade {
    if humidity_pct < 50 && visibility_m > 15_000.0 {
        Grade::Excellent
    } else if humidity_pct > 80 || visibility_m < 5_000.0 {
        Grade::Poor
    } else {
        Grade::Average
    }
}

/// `temperature - (100 - humidity) / 5`, rounded half-up
///
/// A coarse heuristic, not a psychrometric dew point.
pub fn approximate_dew_point(temperature_c: f64, humidity_pct: u8) -> f64 {
    let estimate = temperature_c - (100.0 - f64::from(humidity_pct)) / 5.0;
    (estimate + 0.5).floor()
}
