//! Service implementation for the entitlement `AuthZ` plugin.

use authz_resolver_sdk::{
    AuthBasisData, AuthBasisEntry, AuthBasisType, AuthZResolverError, AuthorizerResult,
    DenyReason, GrantScope, RequesterData, ResourceDescriptor, Role, RoleGrantBasis,
};
use esgf_security::SecurityContext;
use tracing::{debug, warn};

use super::grants::EntitlementGrants;
use super::parser::EntitlementParser;

/// Entitlement authorizer.
pub struct Service {
    parser: EntitlementParser,
    basis_service: Option<String>,
    auth_policy_id: Option<String>,
}

impl Service {
    #[must_use]
    pub fn new(parser: EntitlementParser) -> Self {
        Self {
            parser,
            basis_service: None,
            auth_policy_id: None,
        }
    }

    #[must_use]
    pub fn with_basis_service(mut self, service: Option<String>) -> Self {
        self.basis_service = service;
        self
    }

    #[must_use]
    pub fn with_auth_policy_id(mut self, id: Option<String>) -> Self {
        self.auth_policy_id = id;
        self
    }

    /// Check the project grant, then a node grant for every asset host.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` naming the first missing project or node grant.
    #[tracing::instrument(
        skip_all,
        fields(collection = %resource.collection_id(), item = %resource.item_id(), role = %role)
    )]
    pub fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, AuthZResolverError> {
        let grants = self
            .parser
            .grants(ctx.entitlements().iter().map(String::as_str));
        debug!(grants = grants.len(), "decoded entitlements");

        let project = resource.project();
        check_project(&grants, project, role).map_err(deny)?;
        let mut basis = vec![AuthBasisEntry::Grant(RoleGrantBasis {
            scope: GrantScope::Project,
            id: project.to_owned(),
            role,
        })];

        let mut nodes: Vec<String> = Vec::new();
        for href in resource.asset_hrefs() {
            let node = asset_node(href);
            check_node(&grants, &node, role).map_err(deny)?;
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        basis.extend(nodes.into_iter().map(|id| {
            AuthBasisEntry::Grant(RoleGrantBasis {
                scope: GrantScope::Node,
                id,
                role,
            })
        }));

        Ok(AuthorizerResult {
            auth_policy_id: self.auth_policy_id.clone(),
            client_id: ctx.client_id().map(ToOwned::to_owned),
            requester_data: RequesterData::from_context(ctx),
            auth_basis_data: AuthBasisData {
                authorization_basis_type: AuthBasisType::Entitlement,
                authorization_basis_service: self
                    .basis_service
                    .clone()
                    .unwrap_or_else(|| ctx.issuer().to_owned()),
                authorization_basis: basis,
            },
        })
    }
}

fn check_project(grants: &EntitlementGrants, project: &str, role: Role) -> Result<(), DenyReason> {
    match grants.project_roles(project) {
        None => Err(DenyReason::ProjectPermissionMissing {
            project: project.to_owned(),
            role,
        }),
        Some(roles) if !roles.contains(&role) => Err(DenyReason::ProjectRoleMissing {
            project: project.to_owned(),
            role,
        }),
        Some(_) => Ok(()),
    }
}

fn check_node(grants: &EntitlementGrants, node: &str, role: Role) -> Result<(), DenyReason> {
    match grants.node_roles(node) {
        None => Err(DenyReason::NodePermissionMissing {
            node: node.to_owned(),
            role,
        }),
        Some(roles) if !roles.contains(&role) => Err(DenyReason::NodeRoleMissing {
            node: node.to_owned(),
            role,
        }),
        Some(_) => Ok(()),
    }
}

/// Host of an asset reference; an unparseable reference is its own node and
/// can never hold a grant.
fn asset_node(href: &str) -> String {
    url::Url::parse(href)
        .ok()
        .and_then(|url| url.host_str().map(ToOwned::to_owned))
        .unwrap_or_else(|| href.to_owned())
}

fn deny(reason: DenyReason) -> AuthZResolverError {
    warn!(deny_reason = %reason, stage = ?reason.stage(), "authorization denied");
    AuthZResolverError::forbidden(reason)
}
