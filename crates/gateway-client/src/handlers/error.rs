//! Handler error types

use thiserror::Error;

use crate::transport::TransportError;

/// Handler error type
///
/// Never fatal to the event loop: the driver logs it and moves on to the next frame.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not decode into the shape for `what` (an op or event name)
    #[error("Invalid {what} payload: {source}")]
    InvalidPayload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Identify/Resume needs a token and none was supplied
    #[error("No authentication token")]
    MissingToken,

    /// Outbound frame could not be queued
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl HandlerError {
    #[must_use]
    pub fn invalid_payload(what: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidPayload { what, source }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
