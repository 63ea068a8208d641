//! Configuration for the group `AuthZ` plugin.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupAuthZPluginConfig {
    /// Path of the access-control policy document.
    pub policy_path: Option<PathBuf>,

    /// Inline policy document; takes precedence over `policy_path`.
    pub policy: Option<serde_json::Value>,

    /// Groups authorized for every record in addition to the policy match.
    pub admin_groups: Vec<String>,

    /// Upper bound for the group membership lookup, in milliseconds.
    pub membership_timeout_ms: u64,

    /// Service recorded as the source of the authorization basis.
    pub basis_service: String,
}

impl Default for GroupAuthZPluginConfig {
    fn default() -> Self {
        Self {
            policy_path: None,
            policy: None,
            admin_groups: Vec::new(),
            membership_timeout_ms: 5_000,
            basis_service: "groups.globus.org".to_owned(),
        }
    }
}
