//! Event Stream Module
//!
//! Builds the change-event envelope for an accepted request and delivers it
//! through a [`StreamTransport`](event_stream_sdk::StreamTransport), waiting
//! for the outcome.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{EventStreamConfig, TransportKind};
pub use domain::{EnvelopeFactory, InMemoryTransport, LogTransport, StreamPublisher};
pub use module::EventStream;
