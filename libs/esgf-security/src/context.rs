use secrecy::SecretString;

use crate::introspection::{IdentityDetail, TokenIntrospection};

/// `SecurityContext` carries the verified identity of the caller for one request.
///
/// Built by the token validator after the introspection checks pass and passed
/// to the authorizers. It is never persisted; only the requester fields derived
/// from it end up in the change-event envelope.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Token subject.
    subject: String,
    /// Token issuer.
    issuer: String,
    /// OAuth client the token was issued to.
    client_id: Option<String>,
    username: Option<String>,
    name: Option<String>,
    email: Option<String>,
    /// Linked identities of the caller.
    #[serde(default)]
    identity_set_detail: Vec<IdentityDetail>,
    /// Raw entitlement strings asserted for the caller.
    #[serde(default)]
    entitlements: Vec<String>,
    /// Original bearer token, forwarded to the group membership source.
    /// Never serialized; `SecretString` redacts it in `Debug`.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Build a context from an already-verified introspection response.
    #[must_use]
    pub fn from_introspection(info: TokenIntrospection, bearer_token: impl Into<SecretString>) -> Self {
        SecurityContext {
            subject: info.sub.unwrap_or_default(),
            issuer: info.iss.unwrap_or_default(),
            client_id: info.client_id,
            username: info.username,
            name: info.name,
            email: info.email,
            identity_set_detail: info.identity_set_detail,
            entitlements: info.entitlements,
            bearer_token: Some(bearer_token.into()),
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn identity_set_detail(&self) -> &[IdentityDetail] {
        &self.identity_set_detail
    }

    /// The linked identity whose `sub` equals the token subject, if any.
    #[must_use]
    pub fn primary_identity(&self) -> Option<&IdentityDetail> {
        self.identity(&self.subject)
    }

    /// Look up a linked identity by its `sub`.
    #[must_use]
    pub fn identity(&self, sub: &str) -> Option<&IdentityDetail> {
        self.identity_set_detail.iter().find(|i| i.sub == sub)
    }

    #[must_use]
    pub fn entitlements(&self) -> &[String] {
        &self.entitlements
    }

    /// Get the original bearer token.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject: Option<String>,
    issuer: Option<String>,
    client_id: Option<String>,
    username: Option<String>,
    name: Option<String>,
    email: Option<String>,
    identity_set_detail: Vec<IdentityDetail>,
    entitlements: Vec<String>,
    bearer_token: Option<SecretString>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_owned());
        self
    }

    #[must_use]
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.to_owned());
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = Some(client_id.to_owned());
        self
    }

    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: IdentityDetail) -> Self {
        self.identity_set_detail.push(identity);
        self
    }

    #[must_use]
    pub fn entitlements(mut self, entitlements: Vec<String>) -> Self {
        self.entitlements = entitlements;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject: self.subject.unwrap_or_default(),
            issuer: self.issuer.unwrap_or_default(),
            client_id: self.client_id,
            username: self.username,
            name: self.name,
            email: self.email,
            identity_set_detail: self.identity_set_detail,
            entitlements: self.entitlements,
            bearer_token: self.bearer_token,
        }
    }
}
