use std::time::Duration;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{FetchError, ForecastSource, RawForecast};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,cloud_cover,visibility";
/// 250 hPa sits near jet stream altitude (~10 km)
const HOURLY_FIELDS: &str = "wind_speed_250hPa,wind_speed_10m";
const DAILY_FIELDS: &str = "sunrise,sunset";

/// Open-Meteo forecast client
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn fetch(&self, coord: Coordinate) -> Result<RawForecast, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", coord.latitude.to_string()),
                ("longitude", coord.longitude.to_string()),
            ])
            .query(&[
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("forecast_days", "1"),
                ("timezone", "auto"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_forecast(&body)
    }
}

/// Turn an Open-Meteo response body into a [`RawForecast`]
pub fn parse_forecast(body: &str) -> Result<RawForecast, FetchError> {
    let response: OpenMeteoResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let utc_offset = response
        .utc_offset_seconds
        .and_then(|secs| UtcOffset::from_whole_seconds(secs).ok())
        .unwrap_or(UtcOffset::UTC);

    let current = response
        .current
        .ok_or_else(|| missing("current"))?;
    let current_temperature_c = current.temperature_2m.ok_or_else(|| missing("temperature_2m"))?;
    let cloud_cover_pct = current
        .cloud_cover
        .map(to_percent)
        .ok_or_else(|| missing("cloud_cover"))?;

    let hourly = response.hourly.ok_or_else(|| missing("hourly"))?;
    let hourly_wind_low_altitude = hourly
        .wind_speed_10m
        .ok_or_else(|| missing("wind_speed_10m"))?;

    let daily = response.daily.unwrap_or_default();
    let local_time = |values: Option<Vec<String>>| {
        values
            .and_then(|v| v.into_iter().next())
            .and_then(|raw| parse_local_time(&raw, utc_offset))
    };

    Ok(RawForecast {
        current_temperature_c,
        cloud_cover_pct,
        visibility_m: current.visibility.map(|v| v.max(0.0)),
        humidity_pct: current.relative_humidity_2m.map(to_percent),
        sunrise: local_time(daily.sunrise),
        sunset: local_time(daily.sunset),
        hourly_wind_high_altitude: hourly.wind_speed_250h_pa,
        hourly_wind_low_altitude,
        utc_offset,
    })
}

fn missing(field: &str) -> FetchError {
    FetchError::Malformed(format!("missing field `{}`", field))
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Provider times are local wall-clock without an offset, e.g. `2024-07-15T05:30`
fn parse_local_time(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    PrimitiveDateTime::parse(raw, &format)
        .ok()
        .map(|local| local.assume_offset(offset))
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    utc_offset_seconds: Option<i32>,
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    cloud_cover: Option<f64>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(rename = "wind_speed_250hPa")]
    wind_speed_250h_pa: Option<Vec<Option<f64>>>,
    wind_speed_10m: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    sunrise: Option<Vec<String>>,
    sunset: Option<Vec<String>>,
}
