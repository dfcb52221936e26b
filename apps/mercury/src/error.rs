//! # Client Errors
//!
//! Everything that can go wrong between a view and the backend. Errors are
//! `Clone` because a failed fetch is stored in the cache and handed to every
//! caller that was waiting on it.

use mercury_core::MercuryError;
use thiserror::Error;

/// Errors from the client layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Cannot reach the backend.
    #[error("Cannot connect to backend at {0}")]
    ConnectionFailed(String),

    /// 401 Unauthorized - invalid or missing API key.
    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,

    /// 404 from the backend.
    #[error("No such resource: {0}")]
    NotFound(String),

    /// Backend answered with an error status.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the metadata core.
    #[error(transparent)]
    Core(#[from] MercuryError),
}

impl ClientError {
    /// Validation messages, if this error blocked a submission.
    #[must_use]
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Core(MercuryError::Validation(messages)) => Some(messages),
            _ => None,
        }
    }
}
