#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Event Stream SDK
//!
//! This crate provides the public API for the `event_stream` module:
//!
//! - [`ChangeEvent`] - The envelope emitted for every accepted change
//! - [`EventPublisher`] - Publishes an envelope and reports its delivery
//! - [`StreamTransport`] - Broker connection used by the publisher
//! - [`PublishError`], [`TransportError`] - Error types
//!
//! ## Wire shape
//!
//! ```json
//! {
//!   "metadata": {
//!     "auth": {"requester_data": {...}, "auth_basis_data": {...}},
//!     "event_id": "5b0d...", "request_id": "...",
//!     "publisher": {"package": "esgcet", "version": "5.3.0"},
//!     "time": "2024-10-01T12:00:00Z", "schema_version": "1.0.0"
//!   },
//!   "data": {
//!     "type": "STAC", "version": "1.0.0",
//!     "payload": {"method": "POST", "collection_id": "CMIP6", "item": {...}}
//!   }
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod transport;

pub use api::EventPublisher;
pub use error::{PublishError, TransportError};
pub use models::{
    ChangeEvent, DATA_TYPE, DATA_VERSION, EventData, EventMetadata, Payload, PublisherInfo,
    SCHEMA_VERSION,
};
pub use transport::{DeliveryReceipt, StreamRecord, StreamTransport};
