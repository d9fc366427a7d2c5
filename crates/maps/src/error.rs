//! Error types for the maps client
//!
//! These stay inside the crate's transport layer. Public lookups convert
//! them into [`crate::LookupMiss`] reasons instead of returning them.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for maps operations
pub type MapsResult<T> = Result<T, MapsError>;

/// Maps client errors
#[derive(Error, Debug)]
pub enum MapsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream returned a non-success status
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Redirect chain longer than allowed
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl MapsError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }
}

impl From<MapsError> for pharmalink_core::Error {
    fn from(err: MapsError) -> Self {
        use pharmalink_core::ErrorCode;

        let code = match &err {
            MapsError::Config(_) => ErrorCode::ConfigError,
            MapsError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            MapsError::Json(_) => ErrorCode::InvalidFormat,
            MapsError::ApiResponse { .. } => ErrorCode::UpstreamError,
            e if e.is_timeout() => ErrorCode::RequestTimeout,
            _ => ErrorCode::NetworkError,
        };
        pharmalink_core::Error::new(code, err.to_string()).with_source(err)
    }
}
