//! Error types for the event-stream module.

use thiserror::Error;

/// Errors returned by an [`EventPublisher`](crate::EventPublisher).
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize change event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("delivery failed: {cause}")]
    Transport { cause: TransportError },

    #[error("delivery outcome not known after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The delivery task ended without reporting an outcome.
    #[error("delivery aborted: {0}")]
    Aborted(String),
}

impl From<TransportError> for PublishError {
    fn from(cause: TransportError) -> Self {
        Self::Transport { cause }
    }
}

/// Failure reported by a [`StreamTransport`](crate::StreamTransport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The broker could not be reached.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// The broker refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),
}
