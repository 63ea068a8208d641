//! Entitlement string parsing.

use authz_resolver_sdk::{GrantScope, Role};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::grants::EntitlementGrants;

/// A role grant decoded from one entitlement string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    pub scope: GrantScope,
    pub id: String,
    pub role: Role,
}

/// The configured pattern cannot decode entitlements.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid entitlement pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("entitlement pattern lacks the named group `{0}`")]
    MissingGroup(&'static str),
}

/// Decodes entitlement strings with a configured pattern.
#[derive(Debug, Clone)]
pub struct EntitlementParser {
    pattern: Regex,
}

impl EntitlementParser {
    /// Compile `pattern`, which must define the named groups `type`, `id`
    /// and `role`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern does not compile or lacks a
    /// required group.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let pattern = Regex::new(pattern)?;
        for group in ["type", "id", "role"] {
            if !pattern.capture_names().flatten().any(|name| name == group) {
                return Err(PatternError::MissingGroup(group));
            }
        }
        Ok(Self { pattern })
    }

    /// Decode one entitlement; anything that does not fit yields `None`.
    #[must_use]
    pub fn parse(&self, entitlement: &str) -> Option<Entitlement> {
        let Some(caps) = self.pattern.captures(entitlement) else {
            debug!(entitlement, "skipping entitlement not matching pattern");
            return None;
        };

        let scope = match caps.name("type").map(|m| m.as_str()) {
            Some("project") => GrantScope::Project,
            Some("node") => GrantScope::Node,
            other => {
                debug!(entitlement, scope = ?other, "skipping entitlement with unknown scope");
                return None;
            }
        };
        let id = caps.name("id").map(|m| m.as_str()).filter(|id| !id.is_empty())?;
        let role = match caps.name("role").map(|m| m.as_str().parse::<Role>()) {
            Some(Ok(role)) => role,
            Some(Err(e)) => {
                debug!(entitlement, error = %e, "skipping entitlement with unknown role");
                return None;
            }
            None => return None,
        };

        Some(Entitlement {
            scope,
            id: id.to_owned(),
            role,
        })
    }

    /// Accumulate the grants of every decodable entitlement.
    #[must_use]
    pub fn grants<'a>(&self, entitlements: impl IntoIterator<Item = &'a str>) -> EntitlementGrants {
        let mut grants = EntitlementGrants::default();
        for entitlement in entitlements.into_iter().filter_map(|e| self.parse(e)) {
            match entitlement.scope {
                GrantScope::Project => grants.add_project_grant(&entitlement.id, entitlement.role),
                GrantScope::Node => grants.add_node_grant(&entitlement.id, entitlement.role),
            }
        }
        grants
    }
}
