// src/error.rs
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to quote provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("quote provider returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no daily series returned for {0}")]
    MissingSeries(String),

    #[error("{failed} of {total} quote requests failed: {source}")]
    Refresh {
        failed: usize,
        total: usize,
        #[source]
        source: Box<FetchError>,
    },
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl Reject for ApiError {}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError::bad_gateway(err.to_string())
    }
}
