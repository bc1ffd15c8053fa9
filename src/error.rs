//! Error types for the feed relay.

use thiserror::Error;

/// Common error type for the feed relay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream fetch failed (transport error or non-OK status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Upstream document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Messaging gateway rejected or failed a request.
    #[error("telegram error: {0}")]
    Telegram(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        RelayError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Parse(e.to_string())
    }
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
