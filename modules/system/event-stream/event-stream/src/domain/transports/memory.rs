//! In-process transport.

use std::collections::HashMap;

use async_trait::async_trait;
use event_stream_sdk::{DeliveryReceipt, StreamRecord, StreamTransport, TransportError};
use parking_lot::Mutex;
use xxhash_rust::xxh3::xxh3_64;

/// Keeps delivered records in memory, partitioned by key hash.
///
/// A key always maps to the same partition and offsets grow monotonically per
/// partition, so per-key order is observable.
pub struct InMemoryTransport {
    partitions: u32,
    logs: Mutex<HashMap<(String, u32), Vec<StreamRecord>>>,
    failure: Mutex<Option<TransportError>>,
}

impl InMemoryTransport {
    #[must_use]
    pub fn new(partitions: u32) -> Self {
        Self {
            partitions: partitions.max(1),
            logs: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent send fail with `failure`, or succeed again on `None`.
    pub fn fail_with(&self, failure: Option<TransportError>) {
        *self.failure.lock() = failure;
    }

    #[must_use]
    pub fn partition_for(&self, key: &str) -> u32 {
        u32::try_from(xxh3_64(key.as_bytes()) % u64::from(self.partitions)).unwrap_or(0)
    }

    /// Records of `topic`, ordered by partition then offset.
    #[must_use]
    pub fn records(&self, topic: &str) -> Vec<StreamRecord> {
        let logs = self.logs.lock();
        (0..self.partitions)
            .filter_map(|p| logs.get(&(topic.to_owned(), p)))
            .flatten()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StreamTransport for InMemoryTransport {
    async fn send(&self, record: StreamRecord) -> Result<DeliveryReceipt, TransportError> {
        if let Some(failure) = self.failure.lock().clone() {
            return Err(failure);
        }

        let partition = self.partition_for(&record.key);
        let topic = record.topic.clone();
        let mut logs = self.logs.lock();
        let log = logs.entry((topic.clone(), partition)).or_default();
        let offset = u64::try_from(log.len()).unwrap_or(u64::MAX);
        log.push(record);

        Ok(DeliveryReceipt {
            topic,
            partition,
            offset,
        })
    }
}
