//! Domain errors for the `AuthZ` resolver.

use authz_resolver_sdk::AuthZResolverError;

use crate::config::AuthZMode;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("{mode} authorization requires a group membership source")]
    MembershipSourceMissing { mode: &'static str },

    #[error("failed to initialize {mode} authorizer: {reason}")]
    PluginInit { mode: &'static str, reason: String },

    #[error(transparent)]
    Authorization(#[from] AuthZResolverError),
}

impl DomainError {
    pub(crate) fn plugin_init(mode: AuthZMode, e: &anyhow::Error) -> Self {
        Self::PluginInit {
            mode: mode.as_str(),
            reason: format!("{e:#}"),
        }
    }
}

impl From<DomainError> for AuthZResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Authorization(inner) => inner,
            DomainError::MembershipSourceMissing { .. } | DomainError::PluginInit { .. } => {
                Self::dependency("authz resolver", e)
            }
        }
    }
}
