//! `ItemAuthorizer` implementation for the group `AuthZ` plugin.

use async_trait::async_trait;
use authz_resolver_sdk::{
    AuthZResolverError, AuthorizerResult, ItemAuthorizer, ResourceDescriptor, Role,
};
use esgf_security::SecurityContext;

use super::service::Service;

#[async_trait]
impl ItemAuthorizer for Service {
    async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, AuthZResolverError> {
        Service::authorize(self, ctx, resource, role).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use authz_resolver_sdk::{CollaboratorError, GroupMembership, GroupMembershipSource};
    use secrecy::SecretString;
    use serde_json::json;
    use stac::Item;

    use super::*;
    use crate::domain::PolicyDocument;

    struct StaticMemberships;

    #[async_trait]
    impl GroupMembershipSource for StaticMemberships {
        async fn memberships(
            &self,
            _bearer_token: &SecretString,
        ) -> Result<Vec<GroupMembership>, CollaboratorError> {
            Ok(vec![GroupMembership {
                group_id: "g-ncar".to_owned(),
                identity_id: "id-ncar".to_owned(),
            }])
        }
    }

    #[tokio::test]
    async fn plugin_trait_authorizes_full_item() {
        let policy = PolicyDocument::from_value(&json!({
            "project": {"CMIP6": {"institution_id": {"NCAR": [{"uuid": "g-ncar"}]}}}
        }))
        .unwrap();
        let service = Service::new(
            Arc::new(policy),
            Arc::new(StaticMemberships),
            Duration::from_secs(1),
            "groups.globus.org",
        );
        let plugin: &dyn ItemAuthorizer = &service;

        let item: Item = serde_json::from_value(json!({
            "id": "CMIP6.CMIP.NCAR.CESM2.historical.r1i1p1f1.Amon.tas.gn.v20190308",
            "collection": "CMIP6",
            "properties": {"project": "CMIP6", "institution_id": "NCAR"}
        }))
        .unwrap();
        let resource = ResourceDescriptor::from_item(&item, "CMIP6").unwrap();
        let ctx = SecurityContext::builder()
            .subject("sub-1")
            .bearer_token("token".to_owned())
            .build();

        let result = plugin.authorize(&ctx, &resource, Role::Create).await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().auth_basis_data.authorization_basis.len(), 1);
    }
}
