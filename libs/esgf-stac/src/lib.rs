#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! STAC record and patch models.
//!
//! The gateway never stores records; these types only describe what a caller
//! submits so it can be authorized, validated and forwarded unchanged.

pub mod item;
pub mod patch;

pub use item::{Asset, Item};
pub use patch::{PatchDocument, PatchOperation, PatchPathError, parse_pointer};
