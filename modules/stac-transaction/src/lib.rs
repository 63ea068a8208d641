#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! STAC Transaction Gateway
//!
//! Gates changes to dataset metadata records and records every accepted
//! change as one event on a durable stream. Each request goes through:
//!
//! 1. token verification ([`TransactionService::authenticate`])
//! 2. authorization by the configured authorizer (group policy or
//!    entitlements)
//! 3. validation of the record or patch
//! 4. publication of the change event, waiting for the delivery outcome
//!
//! Any failure maps to a [`Problem`](api::Problem); success returns
//! [`Accepted`] with the event and request ids.

pub mod api;
pub mod config;
pub mod domain;
pub mod module;
pub mod telemetry;

pub use api::Problem;
pub use config::{AppConfig, LogFormat, LoggingConfig};
pub use domain::{Accepted, RequestMeta, TransactionError, TransactionService};
pub use module::{Collaborators, StacTransaction};
pub use telemetry::init_tracing;
