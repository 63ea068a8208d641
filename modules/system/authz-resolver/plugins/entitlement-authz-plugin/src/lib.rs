#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Entitlement `AuthZ` Plugin
//!
//! Authorizes a record from role grants the identity provider asserts as
//! entitlement strings, without calling any external service.
//!
//! An entitlement decomposes into a scope (`project` or `node`), an id and a
//! role. With the default pattern all of these are accepted:
//!
//! ```text
//! project:CMIP6:CREATE
//! node:data.example.org:role=UPDATE
//! urn:mace:egi.eu:group:esgf:project:CMIP6:role=CREATE#aai.egi.eu
//! ```
//!
//! A request for role `R` on a record is granted when the record's project
//! holds `R` and every asset host holds `R`. The project is checked first, so
//! project and node denials are always distinguishable.

pub mod config;
pub mod domain;
pub mod module;

pub use config::EntitlementAuthZPluginConfig;
pub use domain::{Entitlement, EntitlementGrants, EntitlementParser, RoleGrants, Service};
pub use module::EntitlementAuthZPlugin;

/// The entitlement authorizer.
pub type EntitlementAuthorizer = Service;
