//! `ItemAuthorizer` implementation for the entitlement `AuthZ` plugin.

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
        Service::authorize(self, ctx, resource, role)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;
    use stac::Item;

    use super::*;
    use crate::config::DEFAULT_ENTITLEMENT_PATTERN;
    use crate::domain::EntitlementParser;

    #[tokio::test]
    async fn plugin_trait_denies_missing_node() {
        let service = Service::new(EntitlementParser::new(DEFAULT_ENTITLEMENT_PATTERN).unwrap());
        let plugin: &dyn ItemAuthorizer = &service;

        let item: Item = serde_json::from_value(json!({
            "id": "CMIP6.CMIP.NCAR.CESM2.historical.r1i1p1f1.Amon.tas.gn.v20190308",
            "collection": "CMIP6",
            "properties": {"project": "CMIP6"},
            "assets": {"data0000": {"href": "https://data.example.org/tas.nc"}}
        }))
        .unwrap();
        let resource = ResourceDescriptor::from_item(&item, "CMIP6").unwrap();
        let ctx = SecurityContext::builder()
            .entitlements(vec!["project:CMIP6:CREATE".to_owned()])
            .build();

        let err = plugin.authorize(&ctx, &resource, Role::Create).await.unwrap_err();

        assert!(matches!(err, AuthZResolverError::Forbidden { .. }));
        assert!(err.to_string().contains("data.example.org"));
    }
}
