//! Role grant sets.

use std::collections::{BTreeMap, BTreeSet};

use authz_resolver_sdk::Role;

/// Roles granted per id. Adding a grant unions it into the existing set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGrants {
    by_id: BTreeMap<String, BTreeSet<Role>>,
}

impl RoleGrants {
    pub fn add(&mut self, id: &str, role: Role) {
        self.by_id.entry(id.to_owned()).or_default().insert(role);
    }

    #[must_use]
    pub fn roles(&self, id: &str) -> Option<&BTreeSet<Role>> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn has(&self, id: &str, role: Role) -> bool {
        self.roles(id).is_some_and(|roles| roles.contains(&role))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Project and node grants of one caller, built once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitlementGrants {
    project: RoleGrants,
    node: RoleGrants,
}

impl EntitlementGrants {
    pub fn add_project_grant(&mut self, project: &str, role: Role) {
        self.project.add(project, role);
    }

    pub fn add_node_grant(&mut self, node: &str, role: Role) {
        self.node.add(node, role);
    }

    #[must_use]
    pub fn project_roles(&self, project: &str) -> Option<&BTreeSet<Role>> {
        self.project.roles(project)
    }

    #[must_use]
    pub fn node_roles(&self, node: &str) -> Option<&BTreeSet<Role>> {
        self.node.roles(node)
    }

    #[must_use]
    pub fn projects(&self) -> &RoleGrants {
        &self.project
    }

    #[must_use]
    pub fn nodes(&self) -> &RoleGrants {
        &self.node
    }

    /// Number of distinct projects and nodes holding grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.project.len() + self.node.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.project.is_empty() && self.node.is_empty()
    }
}
