//! Partial-update documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One JSON Patch (RFC 6902) operation.
///
/// `move` and `copy` are modelled so they can be recognised and rejected
/// with a precise error; `from` is optional for the same reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        value: Value,
    },
    Replace {
        path: String,
        value: Value,
    },
    Remove {
        path: String,
    },
    Move {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    },
    Copy {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    },
}

impl PatchOperation {
    /// Operation name as it appears on the wire.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Replace { .. } => "replace",
            Self::Remove { .. } => "remove",
            Self::Move { .. } => "move",
            Self::Copy { .. } => "copy",
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. }
            | Self::Replace { path, .. }
            | Self::Remove { path }
            | Self::Move { path, .. }
            | Self::Copy { path, .. } => path,
        }
    }
}

/// The body of a PATCH request, forwarded unchanged in the change event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PatchDocument {
    /// `application/json-patch+json`
    JsonPatch(Vec<PatchOperation>),
    /// `application/merge-patch+json`
    MergePatch(Map<String, Value>),
}

/// Error raised for a path that is not a usable JSON pointer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid patch path '{path}': {reason}")]
pub struct PatchPathError {
    pub path: String,
    pub reason: &'static str,
}

/// Split a JSON pointer into unescaped segments.
///
/// The root pointer (`""` or `"/"`) is rejected: a patch must name a member.
///
/// # Errors
///
/// Returns [`PatchPathError`] when the pointer does not start with `/`, names
/// the document root, or contains an empty segment.
pub fn parse_pointer(path: &str) -> Result<Vec<String>, PatchPathError> {
    let err = |reason| PatchPathError {
        path: path.to_owned(),
        reason,
    };

    let rest = path.strip_prefix('/').ok_or_else(|| err("must start with '/'"))?;
    if rest.is_empty() {
        return Err(err("must not target the document root"));
    }

    rest.split('/')
        .map(|segment| {
            if segment.is_empty() {
                Err(err("contains an empty segment"))
            } else {
                Ok(segment.replace("~1", "/").replace("~0", "~"))
            }
        })
        .collect()
}
