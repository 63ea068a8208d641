//! `AuthZ` Resolver Module
//!
//! Verifies the caller's bearer credential with the identity provider and
//! selects, from configuration, the authorizer every request goes through.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{AuthZMode, AuthZResolverConfig, TokenValidatorConfig};
pub use domain::{AuthZResolverLocalClient, DomainError, Service, TokenValidator};
pub use module::{AuthZResolver, build_authorizer};
