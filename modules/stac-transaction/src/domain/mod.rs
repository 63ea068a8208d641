//! Domain layer for the transaction gateway.

pub mod error;
pub mod service;

pub use error::TransactionError;
pub use service::{Accepted, RequestMeta, TransactionService};
