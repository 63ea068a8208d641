//! Public API trait for event publication.

use async_trait::async_trait;

use crate::error::PublishError;
use crate::models::ChangeEvent;
use crate::transport::DeliveryReceipt;

/// Publishes change events to the stream.
///
/// `publish` returns only once the outcome is known. Events sharing a key
/// keep their relative order.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Serialize `event` and deliver it under `key` to `topic`.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the envelope cannot be encoded
    /// - `Transport` if the broker rejected or failed the message
    /// - `Timeout` if no outcome arrived in time
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        event: &ChangeEvent,
    ) -> Result<DeliveryReceipt, PublishError>;
}
