//! Error types for jobscout.

use thiserror::Error;

/// Result type alias using jobscout's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jobscout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A source driver failed as a whole (query page unreachable, bad payload)
    #[error("Driver error: {0}")]
    Driver(String),

    /// Browser session launch or navigation failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Scoring collaborator failed
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
