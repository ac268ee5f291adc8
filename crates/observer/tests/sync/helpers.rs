use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use darkest_hour_core::Coordinate;
use mockall::mock;
use observer::{
    FetchError, ForecastSource, MapView, Place, RawForecast, SearchProvider, ViewportHandle,
    ViewportSettings, ViewportState,
};
use slog::{o, Discard, Logger};
use tokio::time::{sleep, timeout};

pub const FLY: Duration = Duration::from_millis(2000);

mock! {
    pub Map {}
    impl MapView for Map {
        fn move_to(&self, center: Coordinate, duration: Duration);
        fn center(&self) -> Coordinate;
    }
}

mock! {
    pub Places {}
    #[async_trait]
    impl SearchProvider for Places {
        async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError>;
    }
}

type Responder = dyn Fn(Coordinate) -> (Duration, Result<RawForecast, FetchError>) + Send + Sync;

/// Forecast source that records every call and answers after a scripted delay
pub struct ScriptedForecasts {
    calls: Mutex<Vec<Coordinate>>,
    respond: Box<Responder>,
}

impl ScriptedForecasts {
    pub fn new(
        respond: impl Fn(Coordinate) -> (Duration, Result<RawForecast, FetchError>)
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(vec![]),
            respond: Box::new(respond),
        })
    }

    pub fn instant() -> Arc<Self> {
        Self::new(|coord| (Duration::ZERO, Ok(forecast_for(coord))))
    }

    pub fn calls(&self) -> Vec<Coordinate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastSource for ScriptedForecasts {
    async fn fetch(&self, coord: Coordinate) -> Result<RawForecast, FetchError> {
        self.calls.lock().unwrap().push(coord);
        let (delay, result) = (self.respond)(coord);
        sleep(delay).await;
        result
    }
}

/// Temperature doubles as a tag: it equals the latitude that was fetched
pub fn forecast_for(coord: Coordinate) -> RawForecast {
    RawForecast {
        current_temperature_c: coord.latitude,
        cloud_cover_pct: 5,
        humidity_pct: Some(40),
        visibility_m: Some(20_000.0),
        hourly_wind_low_altitude: vec![Some(10.0); 24],
        ..Default::default()
    }
}

pub fn settings() -> ViewportSettings {
    ViewportSettings {
        refresh_debounce: Duration::from_millis(1000),
        fly_duration: FLY,
    }
}

pub fn logger() -> Logger {
    Logger::root(Discard, o!())
}

pub fn still_map(center: Coordinate) -> MockMap {
    let mut map = MockMap::new();
    map.expect_move_to().times(0);
    map.expect_center().returning(move || center);
    map
}

pub async fn wait_until(
    handle: &ViewportHandle,
    pred: impl FnMut(&ViewportState) -> bool,
) -> ViewportState {
    let mut rx = handle.subscribe();
    let state = timeout(Duration::from_secs(120), rx.wait_for(pred))
        .await
        .expect("timed out waiting for viewport state")
        .expect("viewport controller stopped")
        .clone();
    state
}

pub fn temperature(state: &ViewportState) -> Option<f64> {
    state.conditions.as_ref().map(|c| c.temperature_c)
}

pub fn place(label: &str, center: Coordinate) -> Place {
    Place {
        id: label.to_lowercase(),
        label: label.to_string(),
        center,
        category: Some("city".to_string()),
    }
}

type PlaceResponder = dyn Fn(&str) -> (Duration, Result<Vec<Place>, FetchError>) + Send + Sync;

/// Search provider with per-query latency, for ordering scenarios
pub struct ScriptedPlaces {
    calls: Mutex<Vec<String>>,
    respond: Box<PlaceResponder>,
}

impl ScriptedPlaces {
    pub fn new(
        respond: impl Fn(&str) -> (Duration, Result<Vec<Place>, FetchError>)
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(vec![]),
            respond: Box::new(respond),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedPlaces {
    async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        self.calls.lock().unwrap().push(query.to_string());
        let (delay, result) = (self.respond)(query);
        sleep(delay).await;
        result
    }
}
