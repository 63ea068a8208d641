//! Error types for the `AuthZ` resolver module.

use serde::Serialize;
use thiserror::Error;

use crate::models::Role;

/// Errors returned by an [`ItemAuthorizer`](crate::ItemAuthorizer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthZResolverError {
    /// The request itself is malformed (e.g. collection mismatch).
    /// Raised before any authorization decision is attempted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The caller is not entitled to act on the resource.
    #[error("forbidden: {reason}")]
    Forbidden { reason: DenyReason },

    /// An external collaborator failed; the originating cause is attached.
    #[error("{service} failed: {cause}")]
    Dependency { service: String, cause: String },
}

impl AuthZResolverError {
    #[must_use]
    pub fn forbidden(reason: DenyReason) -> Self {
        Self::Forbidden { reason }
    }

    #[must_use]
    pub fn dependency(service: impl Into<String>, cause: impl ToString) -> Self {
        Self::Dependency {
            service: service.into(),
            cause: cause.to_string(),
        }
    }

    /// The deny reason, when this is an authorization denial.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Forbidden { reason } => Some(reason),
            Self::InvalidRequest(_) | Self::Dependency { .. } => None,
        }
    }
}

/// Stage of the decision at which a request was denied.
///
/// Checks run in this order and stop at the first failure, so a project-level
/// denial is never reported as a node-level one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyStage {
    Token,
    Group,
    Project,
    Node,
}

/// Why a request was denied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DenyReason {
    #[error("token rejected: {0}")]
    Token(String),

    #[error("no group membership authorizes this record")]
    NoMatchingGroup,

    #[error("group membership lookup timed out")]
    MembershipLookupTimedOut,

    /// No grant at all for the project; `role` is the one that was needed.
    #[error("Project permission missing for {project} (requires {role})")]
    ProjectPermissionMissing { project: String, role: Role },

    #[error("Project role ({role}) permission missing for {project}")]
    ProjectRoleMissing { project: String, role: Role },

    #[error("Node permission missing for {node} (requires {role})")]
    NodePermissionMissing { node: String, role: Role },

    #[error("Node role ({role}) permission missing for {node}")]
    NodeRoleMissing { node: String, role: Role },
}

impl DenyReason {
    #[must_use]
    pub fn stage(&self) -> DenyStage {
        match self {
            Self::Token(_) => DenyStage::Token,
            Self::NoMatchingGroup | Self::MembershipLookupTimedOut => DenyStage::Group,
            Self::ProjectPermissionMissing { .. } | Self::ProjectRoleMissing { .. } => {
                DenyStage::Project
            }
            Self::NodePermissionMissing { .. } | Self::NodeRoleMissing { .. } => DenyStage::Node,
        }
    }

    /// Whether the message may be returned to the caller.
    ///
    /// Role-grant denials only name the caller's own missing grant; group and
    /// token denials would reveal policy internals and stay generic.
    #[must_use]
    pub fn is_caller_visible(&self) -> bool {
        matches!(self.stage(), DenyStage::Project | DenyStage::Node)
    }
}

/// Failure of an external collaborator (identity verifier, group source).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The collaborator could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with an error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn project_and_node_denials_are_distinguishable() {
        let project = DenyReason::ProjectRoleMissing {
            project: "CMIP6".to_owned(),
            role: Role::Create,
        };
        let node = DenyReason::NodePermissionMissing {
            node: "data.example.org".to_owned(),
            role: Role::Create,
        };

        assert_eq!(
            project.to_string(),
            "Project role (CREATE) permission missing for CMIP6"
        );
        assert_eq!(
            node.to_string(),
            "Node permission missing for data.example.org (requires CREATE)"
        );
        assert_eq!(project.stage(), DenyStage::Project);
        assert_eq!(node.stage(), DenyStage::Node);
    }

    #[test]
    fn group_denials_are_not_caller_visible() {
        assert!(!DenyReason::NoMatchingGroup.is_caller_visible());
        assert!(!DenyReason::Token("inactive".to_owned()).is_caller_visible());
        assert!(
            DenyReason::NodeRoleMissing {
                node: "n".to_owned(),
                role: Role::Delete
            }
            .is_caller_visible()
        );
    }

    #[test]
    fn dependency_error_keeps_cause() {
        let err = AuthZResolverError::dependency(
            "group membership source",
            CollaboratorError::Unavailable("connection refused".to_owned()),
        );

        assert_eq!(
            err.to_string(),
            "group membership source failed: service unavailable: connection refused"
        );
        assert!(err.deny_reason().is_none());
    }
}
