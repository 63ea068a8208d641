//! Entitlement `AuthZ` plugin wiring.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::EntitlementAuthZPluginConfig;
use crate::domain::{EntitlementParser, Service};

/// Entitlement `AuthZ` plugin.
pub struct EntitlementAuthZPlugin;

impl EntitlementAuthZPlugin {
    /// Compile the entitlement pattern and build the authorizer service.
    ///
    /// # Errors
    ///
    /// Fails when the configured pattern is invalid.
    pub fn init(
        cfg: &EntitlementAuthZPluginConfig,
        auth_policy_id: Option<String>,
    ) -> anyhow::Result<Arc<Service>> {
        info!("Initializing entitlement_authz_plugin");

        let parser = EntitlementParser::new(&cfg.pattern).context("entitlement pattern")?;
        let service = Service::new(parser)
            .with_basis_service(cfg.basis_service.clone())
            .with_auth_policy_id(auth_policy_id);

        info!(pattern = %cfg.pattern, "Entitlement authz plugin initialized");
        Ok(Arc::new(service))
    }
}
