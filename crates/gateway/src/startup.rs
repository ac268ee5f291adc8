use std::{sync::Arc, time::Instant};

use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::{info, warn};
use observer::{ForecastSource, NominatimClient, OpenMeteoClient, SearchProvider};
use tower_http::cors::{Any, CorsLayer};

use crate::{geo, search, weather, Cli};

#[derive(Clone)]
pub struct AppState {
    pub forecasts: Arc<dyn ForecastSource>,
    pub places: Arc<dyn SearchProvider>,
    /// Answer `/api/geo` with the fixed development location
    pub dev_geo: bool,
}

pub fn build_app_state(cli: &Cli) -> Result<AppState, anyhow::Error> {
    let user_agent = cli.user_agent();
    let timeout = cli.request_timeout();

    let forecasts = OpenMeteoClient::new(cli.forecast_url(), &user_agent, timeout)
        .map_err(|e| anyhow!("error setting up forecast client: {}", e))?;
    let places = NominatimClient::new(cli.search_url(), &user_agent, timeout)
        .map_err(|e| anyhow!("error setting up search client: {}", e))?;

    Ok(AppState {
        forecasts: Arc::new(forecasts),
        places: Arc::new(places),
        dev_geo: cli.dev_geo(),
    })
}

pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/api/weather", get(weather))
        .route("/api/search", get(search))
        .route("/api/geo", get(geo))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

/// One line per request: method, path, status, elapsed
async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    if status.is_server_error() {
        warn!(target: "http", "{} {} -> {} ({:.1}ms)", method, uri, status.as_u16(), elapsed_ms);
    } else {
        info!(target: "http", "{} {} -> {} ({:.1}ms)", method, uri, status.as_u16(), elapsed_ms);
    }

    response
}
