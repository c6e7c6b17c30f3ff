//! Error types for the XML-RPC codec and transport

use ims_core::BackendError;
use thiserror::Error;

/// Result type alias for XML-RPC operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur while encoding, decoding or transporting XML-RPC
#[derive(Error, Debug)]
pub enum RpcError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid backend URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The document is not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// A required element is missing
    #[error("Missing <{0}> element")]
    MissingElement(&'static str),

    /// An element appeared where another was expected
    #[error("Expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    /// A scalar could not be parsed as its declared type
    #[error("Invalid {kind} value: {value:?}")]
    InvalidValue { kind: &'static str, value: String },

    /// Value type not part of XML-RPC
    #[error("Unsupported value type: <{0}>")]
    UnsupportedType(String),
}

impl RpcError {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            value: value.into(),
        }
    }
}

impl From<RpcError> for BackendError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Http(e) if e.is_timeout() => BackendError::Timeout,
            RpcError::Http(e) => BackendError::Transport(e.to_string()),
            RpcError::Status { .. } => BackendError::Transport(err.to_string()),
            RpcError::InvalidUrl(e) => BackendError::Internal(e.to_string()),
            other => BackendError::Protocol(other.to_string()),
        }
    }
}
