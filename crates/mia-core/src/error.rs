//! Centralized error types for MIA.

use thiserror::Error;

/// Main error type for MIA operations.
#[derive(Error, Debug)]
pub enum MiaError {
    /// A required form field was missing or invalid. Raised before any
    /// request is sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session expired or invalid, please log in again")]
    AuthRejected,

    #[error("{0}")]
    Service(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in")]
    NotLoggedIn,
}

/// Result type for MIA operations.
pub type MiaResult<T> = Result<T, MiaError>;

impl MiaError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a service error carrying the server supplied detail.
    pub fn service(detail: impl Into<String>) -> Self {
        Self::Service(detail.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
