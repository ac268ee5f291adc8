use axum::{body::Body, http::Request};
use hyper::{header, Method};
use tower::ServiceExt;

use crate::helpers::{get, send, spawn_app, MockForecasts, MockPlaces};

#[tokio::test]
async fn geo_reads_proxy_headers() {
    let test_app = spawn_app(MockForecasts::new(), MockPlaces::new(), false);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/geo")
        .header("x-vercel-ip-country", "US")
        .header("x-vercel-ip-country-region", "AZ")
        .header("x-vercel-ip-city", "Flagstaff")
        .header("x-vercel-ip-latitude", "35.1983")
        .header("x-vercel-ip-longitude", "-111.6513")
        .header("x-vercel-ip-timezone", "America/Phoenix")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&test_app, request).await;

    assert_eq!(status, 200);
    assert_eq!(body["country"], "US");
    assert_eq!(body["region"], "AZ");
    assert_eq!(body["city"], "Flagstaff");
    assert_eq!(body["latitude"], "35.1983");
    assert_eq!(body["longitude"], "-111.6513");
    assert_eq!(body["timezone"], "America/Phoenix");
    assert!(body["flag"].is_null());
}

#[tokio::test]
async fn geo_without_headers_is_unknown() {
    let test_app = spawn_app(MockForecasts::new(), MockPlaces::new(), false);
    let (status, body) = send(&test_app, get("/api/geo")).await;

    assert_eq!(status, 200);
    assert_eq!(body["country"], "Unknown");
    assert_eq!(body["region"], "Unknown");
    assert_eq!(body["city"], "Unknown");
    assert!(body["latitude"].is_null());
    assert!(body["longitude"].is_null());
}

#[tokio::test]
async fn geo_development_location() {
    let test_app = spawn_app(MockForecasts::new(), MockPlaces::new(), true);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/geo")
        .header("x-vercel-ip-city", "Flagstaff")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&test_app, request).await;

    assert_eq!(status, 200);
    assert_eq!(body["country"], "United States");
    assert_eq!(body["region"], "CA");
    assert_eq!(body["city"], "San Francisco");
    assert_eq!(body["latitude"], "37.7749");
    assert_eq!(body["longitude"], "-122.4194");
    assert_eq!(body["timezone"], "America/Los_Angeles");
    assert_eq!(body["flag"], "🇺🇸");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let test_app = spawn_app(MockForecasts::new(), MockPlaces::new(), true);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/geo")
        .header(header::ORIGIN, "https://example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let test_app = spawn_app(MockForecasts::new(), MockPlaces::new(), false);
    let (status, _) = send(&test_app, get("/api/nope")).await;
    assert_eq!(status, 404);
}
