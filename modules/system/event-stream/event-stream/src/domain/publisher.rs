//! Event publication.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use event_stream_sdk::{
    ChangeEvent, DeliveryReceipt, EventPublisher, PublishError, StreamRecord, StreamTransport,
};
use parking_lot::Mutex;
use tracing::{Instrument, error, info, warn};

type Lanes = Mutex<HashMap<(String, String), Arc<tokio::sync::Mutex<()>>>>;

/// Publishes change events through a [`StreamTransport`].
///
/// Delivery runs on its own task: if the caller goes away mid-publish the
/// send still completes and its outcome is logged. Sends sharing a topic and
/// key go through one lane, so a send abandoned by a timed-out caller still
/// lands before the next send for that key starts.
pub struct StreamPublisher {
    transport: Arc<dyn StreamTransport>,
    delivery_timeout: Duration,
    lanes: Arc<Lanes>,
}

impl StreamPublisher {
    #[must_use]
    pub fn new(transport: Arc<dyn StreamTransport>, delivery_timeout: Duration) -> Self {
        Self {
            transport,
            delivery_timeout,
            lanes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lane(&self, topic: &str, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut lanes = self.lanes.lock();
        Arc::clone(lanes.entry((topic.to_owned(), key.to_owned())).or_default())
    }
}

/// Drop the lane once nobody else holds or waits on it.
fn release_lane(lanes: &Lanes, topic: String, key: String) {
    let mut lanes = lanes.lock();
    let id = (topic, key);
    if lanes.get(&id).is_some_and(|lane| Arc::strong_count(lane) == 1) {
        lanes.remove(&id);
    }
}

#[async_trait]
impl EventPublisher for StreamPublisher {
    #[tracing::instrument(skip_all, fields(topic = %topic, key = %key))]
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        event: &ChangeEvent,
    ) -> Result<DeliveryReceipt, PublishError> {
        let record = StreamRecord {
            topic: topic.to_owned(),
            key: key.to_owned(),
            value: Bytes::from(serde_json::to_vec(event)?),
        };
        let event_id = event.metadata.event_id;
        let request_id = event.metadata.request_id.clone();

        let lane = self.lane(topic, key);
        let lanes = Arc::clone(&self.lanes);
        let lane_id = (topic.to_owned(), key.to_owned());
        let transport = Arc::clone(&self.transport);
        let delivery = async move {
            let turn = lane.lock_owned().await;
            tokio::spawn(
                async move {
                    let outcome = transport.send(record).await;
                    match &outcome {
                        Ok(receipt) => info!(
                            %event_id,
                            %request_id,
                            partition = receipt.partition,
                            offset = receipt.offset,
                            "change event delivered"
                        ),
                        Err(e) => error!(
                            %event_id,
                            %request_id,
                            error = %e,
                            "change event delivery failed"
                        ),
                    }
                    drop(turn);
                    release_lane(&lanes, lane_id.0, lane_id.1);
                    outcome
                }
                .in_current_span(),
            )
            .await
        };

        let result = match tokio::time::timeout(self.delivery_timeout, delivery).await {
            Ok(Ok(outcome)) => outcome.map_err(PublishError::from),
            Ok(Err(join)) => {
                error!(%event_id, error = %join, "delivery task aborted");
                Err(PublishError::Aborted(join.to_string()))
            }
            Err(_) => {
                let after_ms = u64::try_from(self.delivery_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(%event_id, after_ms, "delivery outcome not known in time");
                Err(PublishError::Timeout { after_ms })
            }
        };
        release_lane(&self.lanes, topic.to_owned(), key.to_owned());
        result
    }
}
