//! Error types for the application

use thiserror::Error;

use super::types::Exchange;

/// Result type alias using our RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Request signing errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Alert payload rejected by the validator
    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    /// Exchange identifier outside the supported set
    #[error("Exchange not supported: {0}")]
    UnsupportedExchange(String),

    /// Adapter used without a complete credential set
    #[error("Credentials are not configured for {0}")]
    MissingCredentials(Exchange),

    /// Exchange rejected or failed a request
    #[error("{exchange} error: {message}")]
    Exchange { exchange: Exchange, message: String },

    /// CSV export errors
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Build an exchange-scoped error
    pub fn exchange(exchange: Exchange, message: impl Into<String>) -> Self {
        RelayError::Exchange {
            exchange,
            message: message.into(),
        }
    }
}
