//! Error types for gateway client operations

use thiserror::Error;

use crate::portal::ValidationError;

/// Result type alias for gateway client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur talking to the gateway
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Gateway returned an error response
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Gateway does not know the method
    #[error("{0}")]
    MethodNotFound(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Form input rejected before anything was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl ClientError {
    /// Create a server error from status code and message
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }

    /// HTTP status reported by the gateway, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ServerError { status, .. } => Some(*status),
            ClientError::MethodNotFound(_) => Some(404),
            _ => None,
        }
    }
}
