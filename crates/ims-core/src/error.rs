//! Common error types for RPC backends

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while calling a remote procedure
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend executed the call and reported a fault
    #[error("Fault {code}: {message}")]
    Fault {
        /// Fault code reported by the backend
        code: i64,
        /// Fault string reported by the backend
        message: String,
    },

    /// Transport/communication error (connection refused, non-200 status, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not a valid RPC response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Timeout waiting for response
    #[error("Operation timed out")]
    Timeout,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Short machine-readable label, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Fault { .. } => "fault",
            BackendError::Transport(_) => "transport",
            BackendError::Protocol(_) => "protocol",
            BackendError::Timeout => "timeout",
            BackendError::Internal(_) => "internal",
        }
    }
}
