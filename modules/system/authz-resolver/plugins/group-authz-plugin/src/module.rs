//! Group `AuthZ` plugin wiring.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use authz_resolver_sdk::GroupMembershipSource;
use tracing::info;

use crate::config::GroupAuthZPluginConfig;
use crate::domain::{PolicyDocument, Service};

/// Group `AuthZ` plugin.
pub struct GroupAuthZPlugin;

impl GroupAuthZPlugin {
    /// Load the policy document and build the authorizer service.
    ///
    /// # Errors
    ///
    /// Fails when no policy is configured or the policy document is invalid.
    pub fn init(
        cfg: &GroupAuthZPluginConfig,
        memberships: Arc<dyn GroupMembershipSource>,
        auth_policy_id: Option<String>,
    ) -> anyhow::Result<Arc<Service>> {
        info!("Initializing group_authz_plugin");

        let policy = match (&cfg.policy, &cfg.policy_path) {
            (Some(inline), _) => PolicyDocument::from_value(inline).context("inline policy")?,
            (None, Some(path)) => PolicyDocument::load(path)
                .with_context(|| format!("policy document {}", path.display()))?,
            (None, None) => anyhow::bail!("group authorization requires `policy` or `policy_path`"),
        };
        info!(
            version = policy.version.as_deref().unwrap_or("unversioned"),
            admin_groups = cfg.admin_groups.len(),
            membership_timeout_ms = cfg.membership_timeout_ms,
            "Loaded access-control policy"
        );

        let service = Service::new(
            Arc::new(policy),
            memberships,
            Duration::from_millis(cfg.membership_timeout_ms),
            cfg.basis_service.clone(),
        )
        .with_admin_groups(cfg.admin_groups.clone())
        .with_auth_policy_id(auth_policy_id);

        info!("Group authz plugin initialized");
        Ok(Arc::new(service))
    }
}
