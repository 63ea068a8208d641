//! Token introspection model returned by the identity verifier.

use serde::{Deserialize, Deserializer, Serialize};

/// Result of introspecting a bearer credential.
///
/// Mirrors the OAuth 2.0 introspection response with the identity-set
/// extension used by the federated identity provider. `aud` may arrive either
/// as a single string or as a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenIntrospection {
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub aud: Vec<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Linked identities of the caller, used to attach display fields to
    /// group memberships.
    #[serde(default)]
    pub identity_set_detail: Vec<IdentityDetail>,
    /// Entitlement strings asserted by the identity provider.
    #[serde(default, alias = "eduperson_entitlement")]
    pub entitlements: Vec<String>,
}

/// One linked identity of the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityDetail {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_authentication: Option<i64>,
}

impl TokenIntrospection {
    /// Whether `client_id` is one of the token audiences.
    #[must_use]
    pub fn has_audience(&self, client_id: &str) -> bool {
        self.aud.iter().any(|a| a == client_id)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(aud)) => vec![aud],
        Some(OneOrMany::Many(auds)) => auds,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn audience_accepts_single_string() {
        let info: TokenIntrospection = serde_json::from_str(
            r#"{"active": true, "sub": "abc", "aud": "transaction-api", "scope": "ingest"}"#,
        )
        .unwrap();

        assert_eq!(info.aud, vec!["transaction-api"]);
        assert!(info.has_audience("transaction-api"));
    }

    #[test]
    fn audience_accepts_list_and_missing_fields_default() {
        let info: TokenIntrospection =
            serde_json::from_str(r#"{"aud": ["a", "b"]}"#).unwrap();

        assert!(!info.active);
        assert!(info.has_audience("b"));
        assert!(info.scope.is_empty());
        assert!(info.identity_set_detail.is_empty());
    }

    #[test]
    fn entitlements_accept_eduperson_claim() {
        let info: TokenIntrospection = serde_json::from_str(
            r#"{"active": true, "eduperson_entitlement": ["project:CMIP6:CREATE"]}"#,
        )
        .unwrap();

        assert_eq!(info.entitlements, vec!["project:CMIP6:CREATE"]);
    }
}
