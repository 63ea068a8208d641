//! Local (in-process) client for the `AuthZ` resolver.

use std::sync::Arc;

use async_trait::async_trait;
use authz_resolver_sdk::{
    AuthZResolverError, AuthorizerResult, ItemAuthorizer, ResourceDescriptor, Role,
};
use esgf_security::SecurityContext;

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct AuthZResolverLocalClient {
    svc: Arc<Service>,
}

impl AuthZResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthZResolverError {
    let e = AuthZResolverError::from(e);
    if let AuthZResolverError::Dependency { .. } = e {
        tracing::error!(operation = op, error = %e, "authz_resolver call failed");
    }
    e
}

#[async_trait]
impl ItemAuthorizer for AuthZResolverLocalClient {
    async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, AuthZResolverError> {
        self.svc
            .authorize(ctx, resource, role)
            .await
            .map_err(|e| log_and_convert("authorize", e))
    }
}
