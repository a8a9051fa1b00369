//! Error types for traceback-core

use thiserror::Error;

/// Result type alias using the crate's top-level error.
pub type Result<T> = std::result::Result<T, TracebackError>;

/// Top-level error type for traceback-core
///
/// Errors are `Clone` so they can ride along inside analytics events
/// handed back to the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TracebackError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised by the match client transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("No network connection")]
    NoConnection,

    #[error("Request timed out")]
    TimedOut,

    #[error("HTTP error: status {status_code}")]
    HttpStatus { status_code: u16 },

    #[error("Failed to decode response: {0}")]
    Decoding(String),

    #[error("Unknown network error: {0}")]
    Unknown(String),
}

impl NetworkError {
    /// True for failures that happened before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NoConnection | Self::TimedOut | Self::Unknown(_))
    }

    /// Maps a status code to an error, `None` for non-error statuses.
    pub fn from_status(status_code: u16) -> Option<Self> {
        (status_code >= 400).then_some(Self::HttpStatus { status_code })
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else if err.is_connect() {
            Self::NoConnection
        } else if err.is_decode() {
            Self::Decoding(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Errors from the durable key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(String),

    #[error("Serialization failure: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
