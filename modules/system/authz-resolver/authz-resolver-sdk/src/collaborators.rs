//! External collaborators consumed by the authorizers.
//!
//! Implementations live outside the core (HTTP clients of the identity
//! provider); tests use in-process fakes.

use async_trait::async_trait;
use esgf_security::TokenIntrospection;
use secrecy::SecretString;

use crate::error::CollaboratorError;
use crate::models::GroupMembership;

/// Verifies a bearer credential with the identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Introspect the token, including the caller's identity set.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the identity provider cannot answer.
    async fn introspect(
        &self,
        bearer_token: &SecretString,
    ) -> Result<TokenIntrospection, CollaboratorError>;
}

/// Lists the caller's verified group memberships.
#[async_trait]
pub trait GroupMembershipSource: Send + Sync {
    /// Active memberships of the caller as `(group_id, identity_id)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the group service cannot answer.
    async fn memberships(
        &self,
        bearer_token: &SecretString,
    ) -> Result<Vec<GroupMembership>, CollaboratorError>;
}
