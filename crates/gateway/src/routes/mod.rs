pub mod geo;
pub mod search;
pub mod weather;

pub use geo::*;
pub use search::*;
pub use weather::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// JSON body of every non-2xx response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}
