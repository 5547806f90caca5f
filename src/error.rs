// src/error.rs

//! Unified error handling for the page importer.

use std::fmt;

use thiserror::Error;

/// Result type alias for importer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote resource could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The fetched document has no `<body>` to import
    #[error("No <body> found in HTML from {0}")]
    MissingBody(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage constraint violated
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record lookup failed
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

/// Why a fetch did not produce a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCause {
    /// The server answered with a non-success status
    Status(u16),
    /// Connection, timeout, or body read failure
    Transport(String),
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchCause::Status(code) => write!(f, "HTTP status {code}"),
            FetchCause::Transport(message) => f.write_str(message),
        }
    }
}

/// A tagged fetch failure for a single URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch {url}: {cause}")]
pub struct FetchFailure {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchFailure {
    pub fn status(url: impl Into<String>, code: u16) -> Self {
        Self {
            url: url.into(),
            cause: FetchCause::Status(code),
        }
    }

    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            cause: FetchCause::Transport(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_display() {
        let failure = FetchFailure::status("https://example.com/a.png", 404);
        assert_eq!(
            failure.to_string(),
            "Failed to fetch https://example.com/a.png: HTTP status 404"
        );
    }

    #[test]
    fn test_fetch_failure_converts_to_app_error() {
        let err: AppError = FetchFailure::transport("https://example.com", "timed out").into();
        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
