//! Framework error type
//!
//! These are failures of the machinery itself (configuration, I/O, JSON,
//! tracing setup). Failures a handler reports to its caller live in
//! [`crate::http_error`] instead.

use thiserror::Error;

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the framework
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Numeric action outside the valid range
    #[error("invalid value of action: {0}")]
    InvalidAction(i64),

    /// Request target could not be parsed as a URI
    #[error("invalid path: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// Tracing subscriber could not be installed
    #[error("Tracing error: {0}")]
    Tracing(String),
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
