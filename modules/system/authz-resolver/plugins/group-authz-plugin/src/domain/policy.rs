//! Access-control policy document.
//!
//! The document is parsed once into a [`PolicyNode`] tree; a node is either a
//! terminal list of groups or a branch of facets. Shape errors are reported
//! here, at load time, with the JSON pointer of the offending node.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A group authorized by a terminal policy node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupDescriptor {
    #[serde(alias = "uuid")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filled only once a membership has been correlated with the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<String>,
}

impl GroupDescriptor {
    #[must_use]
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            name: None,
            identity_id: None,
        }
    }
}

/// One facet of a branch node: record-attribute name and the subtrees keyed
/// by attribute value, both in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub name: String,
    pub values: Vec<(String, PolicyNode)>,
}

/// A node of the policy tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyNode {
    Terminal(Vec<GroupDescriptor>),
    Branch(Vec<Facet>),
}

impl PolicyNode {
    /// Parse a policy tree from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Malformed`] when a node is neither an object of
    /// facets nor a list of group descriptors.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        parse_node(value, "")
    }
}

impl TryFrom<Value> for PolicyNode {
    type Error = PolicyError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// A loaded policy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub version: Option<String>,
    pub root: PolicyNode,
}

impl PolicyDocument {
    /// Parse a document given either as a bare tree or wrapped as
    /// `{"version": ..., "policy": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Malformed`] for an invalid tree.
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        if let Some(obj) = value.as_object()
            && let Some(tree) = obj.get("policy")
            && obj.keys().all(|k| k == "policy" || k == "version")
        {
            let version = match obj.get("version") {
                None => None,
                Some(Value::String(v)) => Some(v.clone()),
                Some(other) => Some(other.to_string()),
            };
            return Ok(Self {
                version,
                root: parse_node(tree, "/policy")?,
            });
        }

        Ok(Self {
            version: None,
            root: parse_node(value, "")?,
        })
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the file cannot be read, is not JSON, or
    /// does not describe a policy tree.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_value(&value)
    }
}

/// Errors raised while loading a policy document.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("policy document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed policy at '{at}': {reason}")]
    Malformed { at: String, reason: String },
}

fn malformed(at: &str, reason: impl Into<String>) -> PolicyError {
    PolicyError::Malformed {
        at: if at.is_empty() { "/".to_owned() } else { at.to_owned() },
        reason: reason.into(),
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn parse_node(value: &Value, at: &str) -> Result<PolicyNode, PolicyError> {
    match value {
        Value::Array(groups) => groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                GroupDescriptor::deserialize(group)
                    .map_err(|e| malformed(&format!("{at}/{i}"), e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PolicyNode::Terminal),
        Value::Object(facets) => {
            let mut branch = Vec::with_capacity(facets.len());
            for (name, subtrees) in facets {
                let facet_at = format!("{at}/{}", escape(name));
                let Value::Object(subtrees) = subtrees else {
                    return Err(malformed(&facet_at, "facet must map values to policy nodes"));
                };
                let values = subtrees
                    .iter()
                    .map(|(val, node)| {
                        parse_node(node, &format!("{facet_at}/{}", escape(val)))
                            .map(|node| (val.clone(), node))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                branch.push(Facet {
                    name: name.clone(),
                    values,
                });
            }
            Ok(PolicyNode::Branch(branch))
        }
        _ => Err(malformed(at, "expected an object of facets or a list of groups")),
    }
}
