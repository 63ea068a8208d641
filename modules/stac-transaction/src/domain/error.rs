use authz_resolver_sdk::{AuthZResolverError, DenyReason};
use event_stream_sdk::PublishError;
use item_validator::ValidationError;
use thiserror::Error;

/// Why a transaction was not accepted.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// Malformed request, rejected before authorization.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("forbidden: {reason}")]
    Forbidden { reason: DenyReason },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An identity or group collaborator failed.
    #[error("{service} failed: {cause}")]
    Dependency { service: String, cause: String },

    /// The change event was not confirmed by the stream.
    #[error("event delivery failed: {0}")]
    Publish(#[from] PublishError),
}

impl TransactionError {
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<AuthZResolverError> for TransactionError {
    fn from(e: AuthZResolverError) -> Self {
        match e {
            AuthZResolverError::InvalidRequest(message) => Self::InvalidRequest(message),
            AuthZResolverError::Forbidden { reason } => Self::Forbidden { reason },
            AuthZResolverError::Dependency { service, cause } => {
                Self::Dependency { service, cause }
            }
        }
    }
}
