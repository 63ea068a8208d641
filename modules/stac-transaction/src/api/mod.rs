//! Caller-facing response types.

pub mod problem;

pub use problem::{Problem, transaction_error_to_problem};
