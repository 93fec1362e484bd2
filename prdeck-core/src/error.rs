//! Error types for prdeck-core

use thiserror::Error;

/// Main error type for the prdeck-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested resource does not exist on the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend refused the request because of conflicting state
    #[error("conflict: {0}")]
    Conflict(String),

    /// A filter value did not match the field's kind
    #[error("invalid filter value for {field}: {message}")]
    InvalidFilter { field: String, message: String },
}

impl Error {
    /// Build an error from a non-success HTTP status and its body.
    ///
    /// The backend reports failures as `{"error": "..."}`; when the body has
    /// that shape only the message is kept.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            404 => Error::NotFound(message),
            409 => Error::Conflict(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Result type alias for prdeck-core
pub type Result<T> = std::result::Result<T, Error>;
