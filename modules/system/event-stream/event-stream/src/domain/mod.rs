//! Domain layer for the event-stream module.

pub mod envelope;
pub mod publisher;
pub mod transports;

pub use envelope::EnvelopeFactory;
pub use publisher::StreamPublisher;
pub use transports::{InMemoryTransport, LogTransport};
