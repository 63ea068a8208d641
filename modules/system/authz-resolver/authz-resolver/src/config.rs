//! Configuration for the `AuthZ` resolver.

use entitlement_authz_plugin::EntitlementAuthZPluginConfig;
use group_authz_plugin::GroupAuthZPluginConfig;
use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthZResolverConfig {
    /// Selects the authorizer implementation.
    pub mode: AuthZMode,

    /// Access policy identifier recorded with every decision.
    pub auth_policy_id: Option<String>,

    pub group: GroupAuthZPluginConfig,

    pub entitlement: EntitlementAuthZPluginConfig,
}

impl Default for AuthZResolverConfig {
    fn default() -> Self {
        Self {
            mode: AuthZMode::Group,
            auth_policy_id: Some("ESGF-Publish-00012".to_owned()),
            group: GroupAuthZPluginConfig::default(),
            entitlement: EntitlementAuthZPluginConfig::default(),
        }
    }
}

/// Authorization mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthZMode {
    /// Policy-matched group memberships from the group service.
    #[default]
    Group,
    /// Project and node role grants carried as entitlements.
    Entitlement,
}

impl AuthZMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Entitlement => "entitlement",
        }
    }
}

/// What an introspected token must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenValidatorConfig {
    /// This service's OAuth client id; must be among the token audiences.
    pub client_id: String,

    /// Required token issuer.
    pub issuer: String,

    /// Required scope string, compared exactly.
    pub required_scope: String,

    /// Upper bound for the introspection call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TokenValidatorConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            issuer: "https://auth.globus.org".to_owned(),
            required_scope: String::new(),
            timeout_ms: 5_000,
        }
    }
}
