//! Partial-record projection of a patch.

use serde_json::{Map, Value};
use stac::{PatchOperation, parse_pointer};

use crate::domain::error::{Rejection, ValidationErrorKind};

/// The record-shaped view of a patch.
///
/// Explicit nulls (removals) are taken out of the projection and listed in
/// `nulled_fields` as JSON pointers, so schema checks never see them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    projection: Map<String, Value>,
    nulled_fields: Vec<String>,
}

impl PartialRecord {
    /// Project a JSON Patch.
    ///
    /// `remove` is treated as setting `null`; `add` and `replace` are merged
    /// into the projection in order, so a later operation on the same path
    /// wins. A `remove` of an array element is not a field removal and is
    /// skipped.
    pub(crate) fn from_operations(operations: &[PatchOperation]) -> Result<Self, Rejection> {
        let mut projection = Map::new();

        for operation in operations {
            let value = match operation {
                PatchOperation::Move { path, .. } | PatchOperation::Copy { path, .. } => {
                    return Err(Rejection::single(
                        ValidationErrorKind::OperationNotPermitted,
                        path.as_str(),
                        operation.op(),
                    ));
                }
                PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
                    value.clone()
                }
                PatchOperation::Remove { .. } => Value::Null,
            };

            let segments = parse_pointer(operation.path()).map_err(|e| {
                Rejection::single(
                    ValidationErrorKind::InvalidPatchPath,
                    operation.path(),
                    e.to_string(),
                )
            })?;

            if value.is_null() && segments.iter().skip(1).any(|s| is_index(s)) {
                continue;
            }

            let Value::Object(nested) = nest(&segments, value) else {
                continue;
            };
            merge(&mut projection, nested);
        }

        Ok(Self::from_projection(projection))
    }

    /// Project an RFC 7386 merge patch; its `null` members are removals.
    pub(crate) fn from_merge_patch(patch: &Map<String, Value>) -> Self {
        Self::from_projection(patch.clone())
    }

    fn from_projection(mut projection: Map<String, Value>) -> Self {
        let mut nulled_fields = Vec::new();
        extract_nulls(&mut projection, "", &mut nulled_fields);
        Self {
            projection,
            nulled_fields,
        }
    }

    #[must_use]
    pub fn projection(&self) -> &Map<String, Value> {
        &self.projection
    }

    /// JSON pointers of the members the patch removes.
    #[must_use]
    pub fn nulled_fields(&self) -> &[String] {
        &self.nulled_fields
    }

    #[must_use]
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.projection.get("properties").and_then(Value::as_object)
    }

    /// Declared extensions, when the patch sets them.
    #[must_use]
    pub fn stac_extensions(&self) -> Option<Vec<String>> {
        self.projection
            .get("stac_extensions")
            .and_then(Value::as_array)
            .map(|urls| urls.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
    }

    /// References of the assets the patch adds or changes.
    #[must_use]
    pub fn asset_hrefs(&self) -> Vec<String> {
        self.projection
            .get("assets")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(Map::values)
            .filter_map(|asset| asset.get("href").and_then(Value::as_str))
            .map(ToOwned::to_owned)
            .collect()
    }
}

fn is_index(segment: &str) -> bool {
    segment == "-" || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

/// Build the value for `segments` from the innermost member outwards. Index
/// segments below the first become one-element arrays.
fn nest(segments: &[String], value: Value) -> Value {
    segments
        .iter()
        .enumerate()
        .rev()
        .fold(value, |inner, (depth, segment)| {
            if depth > 0 && is_index(segment) {
                Value::Array(vec![inner])
            } else {
                let mut map = Map::new();
                map.insert(segment.clone(), inner);
                Value::Object(map)
            }
        })
}

fn merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

fn extract_nulls(map: &mut Map<String, Value>, prefix: &str, nulled: &mut Vec<String>) {
    let mut removed = Vec::new();
    for (key, value) in map.iter_mut() {
        let pointer = format!("{prefix}/{}", key.replace('~', "~0").replace('/', "~1"));
        match value {
            Value::Null => removed.push((key.clone(), pointer)),
            Value::Object(child) => extract_nulls(child, &pointer, nulled),
            _ => {}
        }
    }
    for (key, pointer) in removed {
        map.remove(&key);
        nulled.push(pointer);
    }
}
