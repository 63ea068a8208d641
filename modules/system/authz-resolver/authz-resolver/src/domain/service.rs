//! Domain service for the `AuthZ` resolver.

use std::sync::Arc;

use authz_resolver_sdk::{AuthorizerResult, ItemAuthorizer, ResourceDescriptor, Role};
use esgf_security::SecurityContext;
use tracing::info;

use super::error::DomainError;
use crate::config::AuthZMode;

/// `AuthZ` resolver service: routes every decision to the authorizer selected
/// by configuration.
pub struct Service {
    mode: AuthZMode,
    authorizer: Arc<dyn ItemAuthorizer>,
}

impl Service {
    #[must_use]
    pub fn new(mode: AuthZMode, authorizer: Arc<dyn ItemAuthorizer>) -> Self {
        Self { mode, authorizer }
    }

    #[must_use]
    pub fn mode(&self) -> AuthZMode {
        self.mode
    }

    /// Authorize via the selected implementation.
    ///
    /// # Errors
    ///
    /// Propagates the authorizer's decision or dependency failure.
    #[tracing::instrument(skip_all, fields(mode = self.mode.as_str()))]
    pub async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, DomainError> {
        let result = self.authorizer.authorize(ctx, resource, role).await?;
        info!(
            subject = %result.requester_data.sub,
            basis = result.auth_basis_data.authorization_basis.len(),
            "request authorized"
        );
        Ok(result)
    }
}
