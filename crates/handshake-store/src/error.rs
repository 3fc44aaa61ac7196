//! Handshake errors.

use thiserror::Error;

/// Errors surfaced to the caller of [`HandshakeStore::create`](crate::HandshakeStore::create).
///
/// Unknown, expired and mismatched confirmations are not errors; they resolve
/// to ordinary results on the read and confirm paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to send confirmation prompt: {0}")]
    UpstreamSend(String),
}

/// Failure reported by a [`ConfirmationSender`](crate::ConfirmationSender).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SendError(pub String);

impl SendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
