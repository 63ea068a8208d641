//! `AuthZ` resolver module.

use std::sync::Arc;

use authz_resolver_sdk::{GroupMembershipSource, ItemAuthorizer};
use entitlement_authz_plugin::EntitlementAuthZPlugin;
use group_authz_plugin::GroupAuthZPlugin;
use tracing::info;

use crate::config::{AuthZMode, AuthZResolverConfig};
use crate::domain::{AuthZResolverLocalClient, DomainError, Service};

/// `AuthZ` Resolver module.
///
/// Builds the authorizer selected by `mode` once at startup; the pipeline
/// only sees the resulting [`ItemAuthorizer`].
pub struct AuthZResolver;

impl AuthZResolver {
    /// Build the configured authorizer.
    ///
    /// # Errors
    ///
    /// - [`DomainError::MembershipSourceMissing`] in group mode without a
    ///   membership source
    /// - [`DomainError::PluginInit`] when the selected plugin rejects its
    ///   configuration
    #[tracing::instrument(skip_all, fields(mode = cfg.mode.as_str()))]
    pub fn init(
        cfg: &AuthZResolverConfig,
        memberships: Option<Arc<dyn GroupMembershipSource>>,
    ) -> Result<Arc<AuthZResolverLocalClient>, DomainError> {
        info!("Initializing authz_resolver module");

        let authorizer: Arc<dyn ItemAuthorizer> = match cfg.mode {
            AuthZMode::Group => {
                let memberships = memberships.ok_or(DomainError::MembershipSourceMissing {
                    mode: cfg.mode.as_str(),
                })?;
                GroupAuthZPlugin::init(&cfg.group, memberships, cfg.auth_policy_id.clone())
                    .map_err(|e| DomainError::plugin_init(cfg.mode, &e))?
            }
            AuthZMode::Entitlement => {
                EntitlementAuthZPlugin::init(&cfg.entitlement, cfg.auth_policy_id.clone())
                    .map_err(|e| DomainError::plugin_init(cfg.mode, &e))?
            }
        };

        let svc = Arc::new(Service::new(cfg.mode, authorizer));
        info!("authz_resolver module initialized successfully");
        Ok(Arc::new(AuthZResolverLocalClient::new(svc)))
    }
}

/// Build the configured authorizer behind the capability trait.
///
/// # Errors
///
/// See [`AuthZResolver::init`].
pub fn build_authorizer(
    cfg: &AuthZResolverConfig,
    memberships: Option<Arc<dyn GroupMembershipSource>>,
) -> anyhow::Result<Arc<dyn ItemAuthorizer>> {
    let client: Arc<dyn ItemAuthorizer> = AuthZResolver::init(cfg, memberships)?;
    Ok(client)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use async_trait::async_trait;
    use authz_resolver_sdk::{
        AuthBasisType, AuthZResolverError, CollaboratorError, DenyReason, GroupMembership,
        ResourceDescriptor, Role,
    };
    use esgf_security::SecurityContext;
    use secrecy::SecretString;
    use serde_json::{Map, json};

    use super::*;

    struct NcarMember;

    #[async_trait]
    impl GroupMembershipSource for NcarMember {
        async fn memberships(
            &self,
            _bearer_token: &SecretString,
        ) -> Result<Vec<GroupMembership>, CollaboratorError> {
            Ok(vec![GroupMembership {
                group_id: "g-ncar".to_owned(),
                identity_id: "id-1".to_owned(),
            }])
        }
    }

    fn group_cfg() -> AuthZResolverConfig {
        let mut cfg = AuthZResolverConfig::default();
        cfg.group.policy = Some(json!({
            "project": {"CMIP6": {"institution_id": {"NCAR": [{"group_id": "g-ncar"}]}}}
        }));
        cfg
    }

    fn resource() -> ResourceDescriptor {
        let mut attributes = Map::new();
        attributes.insert("institution_id".to_owned(), json!("NCAR"));
        ResourceDescriptor::for_reference("CMIP6", "item-1", attributes)
    }

    #[tokio::test]
    async fn group_mode_builds_group_authorizer() {
        let authorizer = build_authorizer(&group_cfg(), Some(Arc::new(NcarMember))).unwrap();
        let ctx = SecurityContext::builder()
            .subject("sub-1")
            .bearer_token("tok".to_owned())
            .build();

        let result = authorizer.authorize(&ctx, &resource(), Role::Create).await.unwrap();

        assert_eq!(result.auth_basis_data.authorization_basis_type, AuthBasisType::Group);
        assert_eq!(result.auth_policy_id.as_deref(), Some("ESGF-Publish-00012"));
    }

    #[test]
    fn group_mode_requires_membership_source() {
        let err = AuthZResolver::init(&group_cfg(), None).err().unwrap();
        assert!(matches!(err, DomainError::MembershipSourceMissing { mode: "group" }));
    }

    #[tokio::test]
    async fn entitlement_mode_ignores_membership_source() {
        let cfg = AuthZResolverConfig {
            mode: AuthZMode::Entitlement,
            ..AuthZResolverConfig::default()
        };
        let authorizer = build_authorizer(&cfg, None).unwrap();
        let ctx = SecurityContext::builder()
            .entitlements(vec!["project:CMIP6:UPDATE".to_owned()])
            .build();

        let err = authorizer.authorize(&ctx, &resource(), Role::Create).await.unwrap_err();

        assert_eq!(
            err,
            AuthZResolverError::forbidden(DenyReason::ProjectRoleMissing {
                project: "CMIP6".to_owned(),
                role: Role::Create,
            })
        );
    }

    #[test]
    fn invalid_plugin_config_is_reported() {
        let mut cfg = AuthZResolverConfig {
            mode: AuthZMode::Entitlement,
            ..AuthZResolverConfig::default()
        };
        cfg.entitlement.pattern = "(".to_owned();

        let err = build_authorizer(&cfg, None).err().unwrap();

        assert!(err.to_string().starts_with("failed to initialize entitlement authorizer"));
    }
}
