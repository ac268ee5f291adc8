use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use darkest_hour_core::Coordinate;
use gateway::{app, AppState};
use hyper::{header, Method};
use mockall::mock;
use observer::{FetchError, ForecastSource, Place, RawForecast, SearchProvider};
use serde_json::Value;
use tower::ServiceExt;

mock! {
    pub Forecasts {}
    #[async_trait]
    impl ForecastSource for Forecasts {
        async fn fetch(&self, coord: Coordinate) -> Result<RawForecast, FetchError>;
    }
}

mock! {
    pub Places {}
    #[async_trait]
    impl SearchProvider for Places {
        async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(forecasts: MockForecasts, places: MockPlaces, dev_geo: bool) -> TestApp {
    let app_state = AppState {
        forecasts: Arc::new(forecasts),
        places: Arc::new(places),
        dev_geo,
    };
    TestApp {
        app: app(app_state),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap()
}

/// Send a request and return the status with the decoded JSON body
pub async fn send(test_app: &TestApp, request: Request<Body>) -> (u16, Value) {
    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status().as_u16();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn clear_night_forecast() -> RawForecast {
    RawForecast {
        current_temperature_c: 12.0,
        cloud_cover_pct: 5,
        visibility_m: Some(24_140.0),
        humidity_pct: Some(60),
        hourly_wind_high_altitude: Some(vec![Some(40.0); 24]),
        hourly_wind_low_altitude: vec![Some(8.0); 24],
        ..Default::default()
    }
}
