//! Public API trait for item authorization.

use async_trait::async_trait;
use esgf_security::SecurityContext;

use crate::error::AuthZResolverError;
use crate::models::{AuthorizerResult, Role};
use crate::resource::ResourceDescriptor;

/// The authorization capability.
///
/// Two implementations exist (group policy and entitlements); deployment
/// configuration selects one and the transaction pipeline only sees this trait:
///
/// ```ignore
/// let authorizer: Arc<dyn ItemAuthorizer> = authz_resolver::build_authorizer(&cfg, sources)?;
///
/// let auth = authorizer.authorize(&ctx, &resource, Role::Update).await?;
/// ```
#[async_trait]
pub trait ItemAuthorizer: Send + Sync {
    /// Decide whether the caller may act on `resource` with `role`.
    ///
    /// Returns the requester identity and the basis of the grant on success.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller is not entitled to act on the resource
    /// - `Dependency` if an external collaborator failed
    async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, AuthZResolverError>;
}
