#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `AuthZ` Resolver SDK
//!
//! This crate provides the public API for the `authz_resolver` module:
//!
//! - [`ItemAuthorizer`] - The authorization capability, implemented by the
//!   group-policy and entitlement plugins
//! - [`IdentityVerifier`], [`GroupMembershipSource`] - External collaborators
//! - [`ResourceDescriptor`] - What is being authorized
//! - [`AuthorizerResult`] - Requester identity plus authorization basis, carried
//!   into the change-event envelope for audit
//! - [`AuthZResolverError`], [`DenyReason`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use authz_resolver_sdk::{ItemAuthorizer, ResourceDescriptor, Role};
//!
//! let resource = ResourceDescriptor::from_item(&item, collection_id)?;
//! let auth = authorizer.authorize(&ctx, &resource, Role::Create).await?;
//! ```

pub mod api;
pub mod collaborators;
pub mod error;
pub mod models;
pub mod resource;

// Re-export main types at crate root
pub use api::ItemAuthorizer;
pub use collaborators::{GroupMembershipSource, IdentityVerifier};
pub use error::{AuthZResolverError, CollaboratorError, DenyReason, DenyStage};
pub use models::{
    AuthBasisData, AuthBasisEntry, AuthBasisType, AuthorizedIdentity, AuthorizerResult,
    GrantScope, GroupMembership, RequesterData, Role, RoleGrantBasis,
};
pub use resource::ResourceDescriptor;
