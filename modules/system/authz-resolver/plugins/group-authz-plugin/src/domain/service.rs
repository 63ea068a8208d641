//! Service implementation for the group `AuthZ` plugin.

use std::sync::Arc;
use std::time::Duration;

use authz_resolver_sdk::{
    AuthBasisData, AuthBasisEntry, AuthBasisType, AuthZResolverError, AuthorizedIdentity,
    AuthorizerResult, DenyReason, GroupMembershipSource, RequesterData, ResourceDescriptor, Role,
};
use esgf_security::SecurityContext;
use tracing::{debug, error, warn};

use super::matcher::match_groups;
use super::policy::PolicyDocument;

const MEMBERSHIP_SOURCE: &str = "group membership source";

/// Group-policy authorizer.
///
/// The policy and administrator groups are read-only after construction and
/// shared across requests; memberships are fetched per request.
pub struct Service {
    policy: Arc<PolicyDocument>,
    admin_groups: Vec<String>,
    memberships: Arc<dyn GroupMembershipSource>,
    membership_timeout: Duration,
    basis_service: String,
    auth_policy_id: Option<String>,
}

impl Service {
    #[must_use]
    pub fn new(
        policy: Arc<PolicyDocument>,
        memberships: Arc<dyn GroupMembershipSource>,
        membership_timeout: Duration,
        basis_service: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            admin_groups: Vec::new(),
            memberships,
            membership_timeout,
            basis_service: basis_service.into(),
            auth_policy_id: None,
        }
    }

    /// Authorize members of these groups for every record.
    #[must_use]
    pub fn with_admin_groups(mut self, groups: Vec<String>) -> Self {
        self.admin_groups = groups;
        self
    }

    #[must_use]
    pub fn with_auth_policy_id(mut self, id: Option<String>) -> Self {
        self.auth_policy_id = id;
        self
    }

    /// Group ids allowed to act on `resource`: the policy match plus the
    /// administrator groups.
    #[must_use]
    pub fn allowed_groups(&self, resource: &ResourceDescriptor) -> Vec<&str> {
        match_groups(resource.attributes(), &self.policy.root)
            .iter()
            .map(|g| g.group_id.as_str())
            .chain(self.admin_groups.iter().map(String::as_str))
            .collect()
    }

    /// Authorize the caller against the group policy.
    ///
    /// The role is recorded but not checked: a matching membership grants
    /// every operation on the record.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when no membership intersects the allowed groups, the
    ///   lookup timed out, or the context carries no bearer token
    /// - `Dependency` when the membership source failed
    #[tracing::instrument(
        skip_all,
        fields(collection = %resource.collection_id(), item = %resource.item_id(), role = %role)
    )]
    pub async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, AuthZResolverError> {
        let allowed = self.allowed_groups(resource);
        if allowed.is_empty() {
            return Err(deny(DenyReason::NoMatchingGroup));
        }
        debug!(allowed = ?allowed, "policy matched groups");

        let token = ctx
            .bearer_token()
            .ok_or_else(|| deny(DenyReason::Token("missing bearer token".to_owned())))?;

        let memberships =
            match tokio::time::timeout(self.membership_timeout, self.memberships.memberships(token))
                .await
            {
                Ok(Ok(memberships)) => memberships,
                Ok(Err(e)) => {
                    error!(error = %e, "group membership lookup failed");
                    return Err(AuthZResolverError::dependency(MEMBERSHIP_SOURCE, e));
                }
                Err(_) => return Err(deny(DenyReason::MembershipLookupTimedOut)),
            };

        let basis: Vec<AuthBasisEntry> = memberships
            .iter()
            .filter(|m| allowed.contains(&m.group_id.as_str()))
            .map(|m| AuthBasisEntry::Group(AuthorizedIdentity::new(m, ctx.identity(&m.identity_id))))
            .collect();
        if basis.is_empty() {
            return Err(deny(DenyReason::NoMatchingGroup));
        }
        debug!(matched = basis.len(), "group membership authorized request");

        Ok(AuthorizerResult {
            auth_policy_id: self.auth_policy_id.clone(),
            client_id: ctx.client_id().map(ToOwned::to_owned),
            requester_data: RequesterData::from_context(ctx),
            auth_basis_data: AuthBasisData {
                authorization_basis_type: AuthBasisType::Group,
                authorization_basis_service: self.basis_service.clone(),
                authorization_basis: basis,
            },
        })
    }
}

fn deny(reason: DenyReason) -> AuthZResolverError {
    warn!(deny_reason = %reason, stage = ?reason.stage(), "authorization denied");
    AuthZResolverError::forbidden(reason)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use authz_resolver_sdk::{CollaboratorError, GroupMembership};
    use esgf_security::IdentityDetail;
    use secrecy::SecretString;
    use serde_json::{Map, json};

    use super::*;

    struct FakeMemberships {
        result: Result<Vec<GroupMembership>, CollaboratorError>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeMemberships {
        fn with(groups: &[(&str, &str)]) -> Self {
            Self {
                result: Ok(groups
                    .iter()
                    .map(|(group_id, identity_id)| GroupMembership {
                        group_id: (*group_id).to_owned(),
                        identity_id: (*identity_id).to_owned(),
                    })
                    .collect()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(CollaboratorError::Unavailable("connection refused".to_owned())),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GroupMembershipSource for FakeMemberships {
        async fn memberships(
            &self,
            _bearer_token: &SecretString,
        ) -> Result<Vec<GroupMembership>, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }
    }

    fn policy() -> Arc<PolicyDocument> {
        Arc::new(
            PolicyDocument::from_value(&json!({
                "project": {"CMIP6": {"institution_id": {"NCAR": [{"group_id": "g-ncar"}]}}}
            }))
            .unwrap(),
        )
    }

    fn service(source: Arc<FakeMemberships>) -> Service {
        Service::new(policy(), source, Duration::from_secs(1), "groups.globus.org")
    }

    fn ctx() -> SecurityContext {
        SecurityContext::builder()
            .subject("sub-1")
            .issuer("https://auth.globus.org")
            .client_id("publisher")
            .username("jdoe@ncar.edu")
            .identity(IdentityDetail {
                sub: "id-ncar".to_owned(),
                username: Some("jdoe@ncar.edu".to_owned()),
                identity_provider: Some("idp-ncar".to_owned()),
                last_authentication: Some(1_700_000_000),
                ..IdentityDetail::default()
            })
            .bearer_token("token".to_owned())
            .build()
    }

    fn resource(institution: &str) -> ResourceDescriptor {
        let mut attributes = Map::new();
        attributes.insert("institution_id".to_owned(), json!(institution));
        ResourceDescriptor::for_reference("CMIP6", "item-1", attributes)
    }

    #[tokio::test]
    async fn matching_membership_is_granted_with_identity_fields() {
        let source = Arc::new(FakeMemberships::with(&[("g-other", "id-x"), ("g-ncar", "id-ncar")]));
        let svc = service(source).with_auth_policy_id(Some("ESGF-Publish-00012".to_owned()));

        let result = svc.authorize(&ctx(), &resource("NCAR"), Role::Create).await.unwrap();

        assert_eq!(result.auth_policy_id.as_deref(), Some("ESGF-Publish-00012"));
        assert_eq!(result.client_id.as_deref(), Some("publisher"));
        assert_eq!(result.requester_data.sub, "sub-1");
        assert_eq!(result.auth_basis_data.authorization_basis_type, AuthBasisType::Group);
        assert_eq!(
            result.auth_basis_data.authorization_basis,
            vec![AuthBasisEntry::Group(AuthorizedIdentity {
                group_id: "g-ncar".to_owned(),
                identity_id: "id-ncar".to_owned(),
                username: Some("jdoe@ncar.edu".to_owned()),
                name: None,
                email: None,
                identity_provider: Some("idp-ncar".to_owned()),
                identity_provider_display_name: None,
                last_authentication: Some(1_700_000_000),
            })]
        );
    }

    #[tokio::test]
    async fn unrelated_memberships_are_denied() {
        let source = Arc::new(FakeMemberships::with(&[("g-ipsl", "id-1"), ("g-misc", "id-2")]));
        let svc = service(source);

        let err = svc.authorize(&ctx(), &resource("NCAR"), Role::Create).await.unwrap_err();

        assert_eq!(err, AuthZResolverError::forbidden(DenyReason::NoMatchingGroup));
    }

    #[tokio::test]
    async fn unmatched_record_is_denied_without_lookup() {
        let source = Arc::new(FakeMemberships::with(&[("g-ncar", "id-ncar")]));
        let svc = service(source.clone());

        let err = svc.authorize(&ctx(), &resource("IPSL"), Role::Create).await.unwrap_err();

        assert_eq!(err.deny_reason(), Some(&DenyReason::NoMatchingGroup));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn admin_group_is_authorized_for_any_record() {
        let source = Arc::new(FakeMemberships::with(&[("g-admin", "id-admin")]));
        let svc = service(source).with_admin_groups(vec!["g-admin".to_owned()]);

        let result = svc.authorize(&ctx(), &resource("IPSL"), Role::Delete).await.unwrap();

        assert!(matches!(
            &result.auth_basis_data.authorization_basis[0],
            AuthBasisEntry::Group(identity) if identity.group_id == "g-admin" && identity.username.is_none()
        ));
    }

    #[tokio::test]
    async fn lookup_timeout_is_a_deny() {
        let source = Arc::new(FakeMemberships {
            delay: Some(Duration::from_millis(500)),
            ..FakeMemberships::with(&[("g-ncar", "id-ncar")])
        });
        let svc = Service::new(policy(), source, Duration::from_millis(20), "groups.globus.org");

        let err = svc.authorize(&ctx(), &resource("NCAR"), Role::Create).await.unwrap_err();

        assert_eq!(err.deny_reason(), Some(&DenyReason::MembershipLookupTimedOut));
    }

    #[tokio::test]
    async fn lookup_failure_is_a_dependency_error() {
        let svc = service(Arc::new(FakeMemberships::failing()));

        let err = svc.authorize(&ctx(), &resource("NCAR"), Role::Create).await.unwrap_err();

        assert!(matches!(
            err,
            AuthZResolverError::Dependency { service: ref name, ref cause }
                if name == MEMBERSHIP_SOURCE && cause.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn missing_bearer_token_is_a_token_deny() {
        let svc = service(Arc::new(FakeMemberships::with(&[("g-ncar", "id-ncar")])));
        let ctx = SecurityContext::builder().subject("sub-1").build();

        let err = svc.authorize(&ctx, &resource("NCAR"), Role::Create).await.unwrap_err();

        assert!(matches!(err.deny_reason(), Some(DenyReason::Token(_))));
    }
}
