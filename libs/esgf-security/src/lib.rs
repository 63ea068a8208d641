#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Caller identity shared by the authorization, validation and publishing layers.
//!
//! - [`TokenIntrospection`] is the raw answer of the external identity verifier.
//! - [`SecurityContext`] is the verified identity built from it once the
//!   audience, scope and issuer checks have passed.

pub mod context;
pub mod introspection;

pub use context::{SecurityContext, SecurityContextBuilder};
pub use introspection::{IdentityDetail, TokenIntrospection};
