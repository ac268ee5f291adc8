use std::time::Duration;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use slog::{debug, Logger};

use crate::Geolocator;

/// Reverse-IP lookup against a JSON endpoint shaped like the gateway's `/api/geo`
pub struct HttpGeolocator {
    client: Option<Client>,
    url: String,
    logger: Logger,
}

impl HttpGeolocator {
    pub fn new(url: String, user_agent: &str, timeout: Duration, logger: Logger) -> Self {
        // A client that fails to build only means the lookup resolves to nothing
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .ok();
        Self {
            client,
            url,
            logger,
        }
    }

    async fn try_lookup(&self) -> Result<Option<Coordinate>, String> {
        let client = self.client.as_ref().ok_or("http client unavailable")?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(parse_geo(&body))
    }
}

#[async_trait]
impl Geolocator for HttpGeolocator {
    async fn lookup(&self) -> Option<Coordinate> {
        match self.try_lookup().await {
            Ok(found) => found,
            Err(err) => {
                debug!(self.logger, "geolocation lookup failed"; "url" => &self.url, "error" => err);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoBody {
    latitude: Option<Value>,
    longitude: Option<Value>,
}

/// Accepts numbers or numeric strings, the header-derived payload uses strings
pub fn parse_geo(body: &str) -> Option<Coordinate> {
    let geo: GeoBody = serde_json::from_str(body).ok()?;
    let number = |v: Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let lat = geo.latitude.and_then(number)?;
    let lng = geo.longitude.and_then(number)?;
    Coordinate::checked(lng, lat)
}

/// A location known up front, e.g. from `--latitude/--longitude`
pub struct FixedGeolocator(pub Option<Coordinate>);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn lookup(&self) -> Option<Coordinate> {
        self.0
    }
}
