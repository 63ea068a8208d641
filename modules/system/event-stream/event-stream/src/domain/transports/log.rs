//! Transport writing events to the log.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use event_stream_sdk::{DeliveryReceipt, StreamRecord, StreamTransport, TransportError};
use tracing::info;

/// Writes each record through `tracing` and acknowledges it on partition 0.
#[derive(Default)]
pub struct LogTransport {
    next_offset: AtomicU64,
}

impl LogTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamTransport for LogTransport {
    async fn send(&self, record: StreamRecord) -> Result<DeliveryReceipt, TransportError> {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        info!(
            topic = %record.topic,
            key = %record.key,
            offset,
            value = %String::from_utf8_lossy(&record.value),
            "change event"
        );
        Ok(DeliveryReceipt {
            topic: record.topic,
            partition: 0,
            offset,
        })
    }
}
