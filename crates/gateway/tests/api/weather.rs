use darkest_hour_core::Coordinate;
use observer::FetchError;

use crate::helpers::{clear_night_forecast, get, send, spawn_app, MockForecasts, MockPlaces};

#[tokio::test]
async fn weather_returns_derived_conditions() {
    let mut forecasts = MockForecasts::new();
    forecasts
        .expect_fetch()
        .withf(|coord| *coord == Coordinate::new(-111.65, 35.2))
        .times(1)
        .returning(|_| Ok(clear_night_forecast()));

    let test_app = spawn_app(forecasts, MockPlaces::new(), false);
    let (status, body) = send(&test_app, get("/api/weather?lat=35.2&lng=-111.65")).await;

    assert_eq!(status, 200);
    assert_eq!(body["temperature"], 12.0);
    assert_eq!(body["cloudCover"], 5);
    assert_eq!(body["visibility"], 24140.0);
    assert_eq!(body["humidity"], 60);
    assert_eq!(body["dewPoint"], 4.0);
    assert_eq!(body["isDay"], true);

    let astronomy = &body["astronomy"];
    assert_eq!(astronomy["seeing"], "Excellent");
    assert_eq!(astronomy["transparency"], "Average");
    assert_eq!(astronomy["jetStreamSpeed"], 40.0);
    let phase = astronomy["moonPhase"].as_f64().unwrap();
    assert!((0.0..1.0).contains(&phase));
}

#[tokio::test]
async fn weather_requires_both_parameters() {
    let mut forecasts = MockForecasts::new();
    forecasts.expect_fetch().times(0);

    let test_app = spawn_app(forecasts, MockPlaces::new(), false);
    for uri in ["/api/weather", "/api/weather?lat=35.2", "/api/weather?lng=1&lat="] {
        let (status, body) = send(&test_app, get(uri)).await;
        assert_eq!(status, 400, "{}", uri);
        assert_eq!(body["error"], "Missing lat or lng parameters");
    }
}

#[tokio::test]
async fn weather_rejects_unparseable_or_out_of_range() {
    let mut forecasts = MockForecasts::new();
    forecasts.expect_fetch().times(0);

    let test_app = spawn_app(forecasts, MockPlaces::new(), false);
    for uri in [
        "/api/weather?lat=north&lng=10",
        "/api/weather?lat=91&lng=10",
        "/api/weather?lat=10&lng=-180.5",
    ] {
        let (status, body) = send(&test_app, get(uri)).await;
        assert_eq!(status, 400, "{}", uri);
        assert_eq!(body["error"], "Invalid lat or lng parameters");
    }
}

#[tokio::test]
async fn weather_reports_upstream_failure() {
    let mut forecasts = MockForecasts::new();
    forecasts
        .expect_fetch()
        .times(1)
        .returning(|_| Err(FetchError::Upstream("503 Service Unavailable".to_string())));

    let test_app = spawn_app(forecasts, MockPlaces::new(), false);
    let (status, body) = send(&test_app, get("/api/weather?lat=0&lng=0")).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to fetch weather data");
}
