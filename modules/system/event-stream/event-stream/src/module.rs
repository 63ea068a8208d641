//! Event-stream module wiring.

use std::sync::Arc;
use std::time::Duration;

use event_stream_sdk::{EventPublisher, StreamTransport};
use tracing::info;

use crate::config::{EventStreamConfig, TransportKind};
use crate::domain::{EnvelopeFactory, InMemoryTransport, LogTransport, StreamPublisher};

/// Publisher, envelope factory and topic, built once at startup.
pub struct EventStream {
    pub publisher: Arc<dyn EventPublisher>,
    pub envelopes: EnvelopeFactory,
    pub topic: String,
}

impl EventStream {
    /// Build the module over `transport`, or over the configured built-in
    /// transport when none is given.
    #[must_use]
    pub fn init(cfg: &EventStreamConfig, transport: Option<Arc<dyn StreamTransport>>) -> Self {
        let transport: Arc<dyn StreamTransport> = match (transport, cfg.transport) {
            (Some(transport), _) => transport,
            (None, TransportKind::Log) => Arc::new(LogTransport::new()),
            (None, TransportKind::Memory) => Arc::new(InMemoryTransport::new(cfg.partitions)),
        };
        info!(
            topic = %cfg.topic,
            delivery_timeout_ms = cfg.delivery_timeout_ms,
            "event_stream module initialized"
        );

        Self {
            publisher: Arc::new(StreamPublisher::new(
                transport,
                Duration::from_millis(cfg.delivery_timeout_ms),
            )),
            envelopes: EnvelopeFactory::new(cfg.schema_version.clone()),
            topic: cfg.topic.clone(),
        }
    }
}
