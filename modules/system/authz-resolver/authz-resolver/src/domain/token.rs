//! Bearer credential verification.

use std::sync::Arc;
use std::time::Duration;

use authz_resolver_sdk::{AuthZResolverError, DenyReason, IdentityVerifier};
use esgf_security::{SecurityContext, TokenIntrospection};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, warn};

use crate::config::TokenValidatorConfig;

const IDENTITY_VERIFIER: &str = "identity verifier";

/// Turns a bearer credential into a verified [`SecurityContext`].
///
/// The token must be active, list this service's client id among its
/// audiences, carry exactly the required scope and come from the configured
/// issuer.
pub struct TokenValidator {
    verifier: Arc<dyn IdentityVerifier>,
    cfg: TokenValidatorConfig,
}

impl TokenValidator {
    #[must_use]
    pub fn new(verifier: Arc<dyn IdentityVerifier>, cfg: TokenValidatorConfig) -> Self {
        Self { verifier, cfg }
    }

    /// Extract the credential from an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns a token denial unless the value is `Bearer <token>`.
    pub fn bearer_from_header(header: Option<&str>) -> Result<SecretString, AuthZResolverError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty() && !t.contains(char::is_whitespace))
            .ok_or_else(|| {
                AuthZResolverError::forbidden(DenyReason::Token(
                    "missing or malformed bearer credential".to_owned(),
                ))
            })?;
        Ok(SecretString::from(token.to_owned()))
    }

    /// Introspect `bearer_token` and check the result.
    ///
    /// # Errors
    ///
    /// - `Forbidden` with a token reason when any check fails
    /// - `Dependency` when the identity verifier failed or timed out
    #[tracing::instrument(skip_all)]
    pub async fn validate(
        &self,
        bearer_token: SecretString,
    ) -> Result<SecurityContext, AuthZResolverError> {
        let timeout = Duration::from_millis(self.cfg.timeout_ms);
        let info = match tokio::time::timeout(timeout, self.verifier.introspect(&bearer_token)).await
        {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                error!(error = %e, "token introspection failed");
                return Err(AuthZResolverError::dependency(IDENTITY_VERIFIER, e));
            }
            Err(_) => {
                error!(timeout_ms = self.cfg.timeout_ms, "token introspection timed out");
                return Err(AuthZResolverError::dependency(
                    IDENTITY_VERIFIER,
                    format!("timed out after {} ms", self.cfg.timeout_ms),
                ));
            }
        };

        if let Err(reason) = self.check(&info) {
            warn!(sub = info.sub.as_deref().unwrap_or("unknown"), reason, "token rejected");
            return Err(AuthZResolverError::forbidden(DenyReason::Token(reason.to_owned())));
        }

        debug!(sub = info.sub.as_deref().unwrap_or_default(), "token verified");
        Ok(SecurityContext::from_introspection(
            info,
            bearer_token.expose_secret().to_owned(),
        ))
    }

    fn check(&self, info: &TokenIntrospection) -> Result<(), &'static str> {
        if !info.active {
            return Err("token is not active");
        }
        if !info.has_audience(&self.cfg.client_id) {
            return Err("audience does not include this service");
        }
        if info.scope != self.cfg.required_scope {
            return Err("scope does not match");
        }
        if info.iss.as_deref() != Some(self.cfg.issuer.as_str()) {
            return Err("issuer does not match");
        }
        Ok(())
    }
}
