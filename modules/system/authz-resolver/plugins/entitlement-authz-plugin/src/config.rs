//! Configuration for the entitlement `AuthZ` plugin.

use serde::{Deserialize, Serialize};

/// Default entitlement pattern; must define the `type`, `id` and `role` groups.
pub const DEFAULT_ENTITLEMENT_PATTERN: &str =
    r"^(?:urn:[^#]*?:)?(?P<type>project|node):(?P<id>[^:#]+):(?:role=)?(?P<role>[A-Z]+)(?:#.*)?$";

/// Plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntitlementAuthZPluginConfig {
    /// Regular expression with named groups `type`, `id` and `role`.
    pub pattern: String,

    /// Service recorded as the source of the authorization basis.
    /// Defaults to the token issuer when unset.
    pub basis_service: Option<String>,
}

impl Default for EntitlementAuthZPluginConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_ENTITLEMENT_PATTERN.to_owned(),
            basis_service: None,
        }
    }
}
