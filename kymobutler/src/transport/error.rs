//! Transport errors.

use thiserror::Error;

/// Errors raised by a [`super::Transport`].
///
/// Messages are kept as strings so the error can be cloned into the job
/// outcome and reported more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HTTP client or the request could not be built.
    #[error("Failed to build request: {0}")]
    Build(String),

    /// The request could not be sent or no response was received.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    ///
    /// `body` holds whatever the service sent along, often a JSON document
    /// with an `error` or `messages` entry. Empty when it could not be read.
    #[error("HTTP {status} from {url}")]
    Status {
        status: u16,
        url: String,
        body: Vec<u8>,
    },

    /// The response body could not be read.
    #[error("Failed to read response: {0}")]
    Body(String),
}

impl TransportError {
    /// Returns the HTTP status code, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the body sent with a non-success status, if it is not empty.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            TransportError::Status { body, .. } if !body.is_empty() => Some(body.as_slice()),
            _ => None,
        }
    }
}
