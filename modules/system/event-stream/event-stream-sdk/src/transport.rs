//! Broker transport API.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub topic: String,
    /// Ordering key; the record identifier.
    pub key: String,
    pub value: Bytes,
}

/// Broker acknowledgement of a delivered message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub topic: String,
    pub partition: u32,
    pub offset: u64,
}

/// Connection to the durable stream.
///
/// Implementations may retry internally but must report a single outcome per
/// record and preserve order for records sharing a key.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Deliver `record` and wait for the broker's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the record was not delivered.
    async fn send(&self, record: StreamRecord) -> Result<DeliveryReceipt, TransportError>;
}
