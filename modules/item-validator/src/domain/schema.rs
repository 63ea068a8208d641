//! JSON-schema checks of one extension.

use jsonschema::Validator;
use serde_json::Value;

use crate::domain::error::ValidationIssue;

/// Compiled schema of an extension, in two flavours.
///
/// `full` is applied to complete records. `relaxed` has every `required`
/// keyword removed and is applied to patch projections, which only carry the
/// members being changed.
pub struct SchemaValidator {
    name: String,
    raw: Value,
    full: Validator,
    relaxed: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile `schema` for the extension `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid JSON schema.
    pub fn compile(name: &str, schema: Value) -> anyhow::Result<Self> {
        let full = jsonschema::validator_for(&schema)
            .map_err(|e| anyhow::anyhow!("invalid schema for extension '{name}': {e}"))?;

        let mut stripped = schema.clone();
        strip_required(&mut stripped);
        let relaxed = jsonschema::validator_for(&stripped)
            .map_err(|e| anyhow::anyhow!("invalid schema for extension '{name}': {e}"))?;

        Ok(Self {
            name: name.to_owned(),
            raw: schema,
            full,
            relaxed,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate a complete record.
    #[must_use]
    pub fn validate_full(&self, instance: &Value) -> Vec<ValidationIssue> {
        Self::collect(&self.name, &self.full, instance)
    }

    /// Validate a patch projection; missing members are not reported.
    #[must_use]
    pub fn validate_relaxed(&self, instance: &Value) -> Vec<ValidationIssue> {
        Self::collect(&self.name, &self.relaxed, instance)
    }

    fn collect(name: &str, validator: &Validator, instance: &Value) -> Vec<ValidationIssue> {
        validator
            .iter_errors(instance)
            .map(|e| ValidationIssue::new(name, e.to_string()))
            .collect()
    }

    /// Whether the member at `segments` is listed as required by its parent
    /// schema, following `properties` and `allOf`.
    #[must_use]
    pub fn requires(&self, segments: &[String]) -> bool {
        requires(&self.raw, segments)
    }
}

fn requires(schema: &Value, segments: &[String]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };

    if schema
        .get("allOf")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .any(|sub| requires(sub, segments))
    {
        return true;
    }

    if rest.is_empty() {
        return schema
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(head)));
    }

    schema
        .get("properties")
        .and_then(|p| p.get(head))
        .is_some_and(|child| requires(child, rest))
}

/// Remove `required` constraints at every level.
///
/// Only array-valued `required` keys are keywords; a property that happens to
/// be called `required` has an object schema and is kept.
fn strip_required(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.get("required").is_some_and(Value::is_array) {
                map.remove("required");
            }
            map.values_mut().for_each(strip_required);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_required),
        _ => {}
    }
}
