//! Configuration for the event-stream module.

use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventStreamConfig {
    /// Topic every change event is published to.
    pub topic: String,

    /// How long a request waits for the delivery outcome, in milliseconds.
    pub delivery_timeout_ms: u64,

    /// Envelope schema version.
    pub schema_version: String,

    /// Built-in transport used when no broker transport is supplied.
    pub transport: TransportKind,

    /// Partition count of the in-memory transport.
    pub partitions: u32,
}

impl Default for EventStreamConfig {
    fn default() -> Self {
        Self {
            topic: "esgf-local".to_owned(),
            delivery_timeout_ms: 10_000,
            schema_version: event_stream_sdk::SCHEMA_VERSION.to_owned(),
            transport: TransportKind::Log,
            partitions: 1,
        }
    }
}

/// Built-in transports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Write events to the log and acknowledge them.
    #[default]
    Log,
    /// Keep events in process memory.
    Memory,
}
