#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Group `AuthZ` Plugin
//!
//! Authorizes a record when the caller holds an active membership in one of
//! the groups that the access-control policy assigns to the record's facets.
//!
//! ## Policy document
//!
//! The policy is a tree keyed by facet name, then by facet value, ending in a
//! list of groups:
//!
//! ```json
//! {
//!   "project": {
//!     "CMIP6": {
//!       "institution_id": {
//!         "NCAR": [{"group_id": "5c1b5d6e-..."}]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Matching order
//!
//! Facets are tried in document order, and values within a facet in document
//! order; the first subtree yielding a non-empty group list wins. Authors must
//! place more specific facets first when two facets could both match.
//!
//! ## Configuration
//!
//! ```yaml
//! authz:
//!   group:
//!     policy_path: /etc/esgf/access_control_policy.json
//!     admin_groups: ["8a290d6e-8262-11ef-9fa6-6f9995a83a2e"]
//!     membership_timeout_ms: 5000
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::GroupAuthZPluginConfig;
pub use domain::{GroupDescriptor, PolicyDocument, PolicyError, PolicyNode, Service, match_groups};
pub use module::GroupAuthZPlugin;

/// The group-policy authorizer.
pub type GroupAuthorizer = Service;
