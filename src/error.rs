use std::time::Duration;
use thiserror::Error;

use crate::extract::ExtractError;

/// Errors produced by generation operations and their components.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON handling failed at the serde level.
    #[error("JSON handling failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The extractor exhausted every recovery strategy.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// The operation was cancelled via the cancellation flag.
    #[error("generation was cancelled")]
    Cancelled,

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Provider`](crate::provider::Provider) implementations
    /// when the service answers with a non-success status. `retry_after` is
    /// populated from the `Retry-After` response header when present.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ForgeError {
    fn from(err: anyhow::Error) -> Self {
        ForgeError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
