//! Domain models for the `AuthZ` resolver module.
//!
//! [`AuthorizerResult`] is serialized verbatim as `metadata.auth` of the
//! change-event envelope, so field names here are part of the wire contract.

use std::fmt;
use std::str::FromStr;

use esgf_security::{IdentityDetail, SecurityContext};
use serde::{Deserialize, Serialize};

/// Role required to perform an operation on a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Create,
    Update,
    Delete,
    Replicate,
    Revoke,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Replicate => "REPLICATE",
            Self::Revoke => "REVOKE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "REPLICATE" => Ok(Self::Replicate),
            "REVOKE" => Ok(Self::Revoke),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// An active group membership of the caller, as reported by the group service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMembership {
    pub group_id: String,
    pub identity_id: String,
}

/// A membership that authorized the request, enriched with the display fields
/// of the linked identity it was correlated with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizedIdentity {
    pub group_id: String,
    pub identity_id: String,
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

impl AuthorizedIdentity {
    /// Build the record once the correlating identity (if any) is known.
    #[must_use]
    pub fn new(membership: &GroupMembership, identity: Option<&IdentityDetail>) -> Self {
        Self {
            group_id: membership.group_id.clone(),
            identity_id: membership.identity_id.clone(),
            username: identity.and_then(|i| i.username.clone()),
            name: identity.and_then(|i| i.name.clone()),
            email: identity.and_then(|i| i.email.clone()),
            identity_provider: identity.and_then(|i| i.identity_provider.clone()),
            identity_provider_display_name: identity
                .and_then(|i| i.identity_provider_display_name.clone()),
            last_authentication: identity.and_then(|i| i.last_authentication),
        }
    }
}

/// Scope of a role grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrantScope {
    Project,
    Node,
}

/// A role grant that authorized the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleGrantBasis {
    pub scope: GrantScope,
    pub id: String,
    pub role: Role,
}

/// One justification entry of an authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AuthBasisEntry {
    Group(AuthorizedIdentity),
    Grant(RoleGrantBasis),
}

/// How authorization was granted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthBasisType {
    Group,
    Entitlement,
}

/// Recorded justification of an authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthBasisData {
    pub authorization_basis_type: AuthBasisType,
    /// Service that vouched for the basis (group service or entitlement issuer).
    pub authorization_basis_service: String,
    pub authorization_basis: Vec<AuthBasisEntry>,
}

/// Identity of the requester as recorded in the change event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequesterData {
    pub sub: String,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
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
}

impl RequesterData {
    /// Requester fields from the verified context; identity-provider fields
    /// come from the linked identity matching the token subject.
    #[must_use]
    pub fn from_context(ctx: &SecurityContext) -> Self {
        let primary = ctx.primary_identity();
        Self {
            sub: ctx.subject().to_owned(),
            iss: ctx.issuer().to_owned(),
            client_id: ctx.client_id().map(ToOwned::to_owned),
            username: ctx.username().map(ToOwned::to_owned),
            name: ctx.name().map(ToOwned::to_owned),
            email: ctx.email().map(ToOwned::to_owned),
            identity_provider: primary.and_then(|i| i.identity_provider.clone()),
            identity_provider_display_name: primary
                .and_then(|i| i.identity_provider_display_name.clone()),
        }
    }
}

/// Result of a successful authorization.
///
/// Constructed fresh per request and never persisted beyond the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizerResult {
    /// Identifier of the access policy that produced the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_policy_id: Option<String>,
    /// OAuth client of the requester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub requester_data: RequesterData,
    pub auth_basis_data: AuthBasisData,
}
