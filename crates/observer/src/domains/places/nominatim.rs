use std::time::Duration;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{FetchError, Place, SearchProvider};

/// Results requested per query
pub const SEARCH_LIMIT: usize = 5;

/// OpenStreetMap Nominatim geocoder
///
/// Nominatim's usage policy requires an identifying User-Agent.
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl SearchProvider for NominatimClient {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
            ])
            .query(&[("limit", SEARCH_LIMIT)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_places(&body)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: Value,
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Map a Nominatim JSON array to places, skipping entries with bad coordinates
pub fn parse_places(body: &str) -> Result<Vec<Place>, FetchError> {
    let raw: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    Ok(raw
        .into_iter()
        .filter_map(|item| {
            let lon = item.lon.parse::<f64>().ok()?;
            let lat = item.lat.parse::<f64>().ok()?;
            let id = match item.place_id {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some(Place {
                id,
                label: item.display_name,
                center: Coordinate::checked(lon, lat)?,
                category: item.kind,
            })
        })
        .collect())
}
