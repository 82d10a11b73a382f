//! Adapter error types.

use handoff_cache::{HandoffError, PatternError};
use thiserror::Error;

/// Errors that can occur when an adapter makes a request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The transport failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// The handoff layer could not key, match or decode this request.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<PatternError> for FetchError {
    fn from(e: PatternError) -> Self {
        FetchError::Handoff(e.into())
    }
}
