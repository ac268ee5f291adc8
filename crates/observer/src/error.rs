/// Failure of a single call to an external collaborator
///
/// A response discarded because a newer request superseded it is not an
/// error; the viewport controller logs it at debug level and moves on.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure, timeout, or a client that could not be built
    #[error("upstream request failed: {0}")]
    Upstream(String),
    /// Provider answered with a non-2xx status
    #[error("upstream responded with status {0}")]
    Status(u16),
    /// 2xx response missing required fields after fallbacks
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Stable name for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Upstream(_) | FetchError::Status(_) => "upstream",
            FetchError::Malformed(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Body decoding failures come back from reqwest as well
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Upstream(err.to_string())
        }
    }
}
