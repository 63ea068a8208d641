//! Service implementation for the item validator.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use stac::{Item, PatchDocument, PatchOperation};
use tracing::{debug, warn};

use super::error::{
    Rejection, ValidationContext, ValidationError, ValidationErrorKind, ValidationIssue,
};
use super::extensions::ExtensionSet;
use super::projection::PartialRecord;
use super::vocabulary::Vocabulary;

/// Compiled rules of one collection.
#[derive(Debug)]
pub struct CollectionRules {
    pub extensions: ExtensionSet,
    pub vocabulary: Vocabulary,
}

/// Item validator.
///
/// Rules are compiled once and shared read-only across requests.
#[derive(Debug)]
pub struct Service {
    collections: BTreeMap<String, CollectionRules>,
    strict_extensions: bool,
}

impl Service {
    #[must_use]
    pub fn new(collections: BTreeMap<String, CollectionRules>, strict_extensions: bool) -> Self {
        Self {
            collections,
            strict_extensions,
        }
    }

    #[must_use]
    pub fn is_configured(&self, collection_id: &str) -> bool {
        self.collections.contains_key(collection_id)
    }

    /// Reject collections without validation rules.
    ///
    /// # Errors
    ///
    /// Returns an `unknown_collection` error naming `collection_id`.
    pub fn ensure_configured(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
    ) -> Result<(), ValidationError> {
        self.rules(collection_id)
            .map(|_| ())
            .map_err(|r| reject(ctx, item_id, r))
    }

    fn rules(&self, collection_id: &str) -> Result<&CollectionRules, Rejection> {
        self.collections.get(collection_id).ok_or_else(|| {
            Rejection::single(
                ValidationErrorKind::UnknownCollection,
                "collection_id",
                collection_id,
            )
        })
    }

    /// Validate a complete record and return it with its extension list
    /// normalized.
    ///
    /// Checks run in order: extensions, controlled vocabulary, then the
    /// schema of every configured extension.
    ///
    /// # Errors
    ///
    /// Returns the first failing check with all of its issues.
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item.id))]
    pub fn validate_create(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item: Item,
    ) -> Result<Item, ValidationError> {
        let item_id = item.id.clone();
        self.check_create(collection_id, item)
            .map_err(|r| reject(ctx, &item_id, r))
    }

    fn check_create(&self, collection_id: &str, mut item: Item) -> Result<Item, Rejection> {
        let rules = self.rules(collection_id)?;

        item.stac_extensions = rules
            .extensions
            .normalize(&item.stac_extensions, self.strict_extensions)?;

        let issues = rules.vocabulary.check_item(&item);
        if !issues.is_empty() {
            return Err(Rejection::new(ValidationErrorKind::Vocabulary, issues));
        }

        let instance = item.to_value();
        let issues: Vec<ValidationIssue> = rules
            .extensions
            .schemas()
            .flat_map(|schema| schema.validate_full(&instance))
            .collect();
        if !issues.is_empty() {
            return Err(Rejection::new(ValidationErrorKind::Schema, issues));
        }

        debug!(extensions = item.stac_extensions.len(), "record validated");
        Ok(item)
    }

    /// Project a patch document onto a partial record without validating
    /// its content.
    ///
    /// The projection is enough to authorize the request: it carries the
    /// asset references the caller wants to write.
    ///
    /// # Errors
    ///
    /// Returns `unknown_collection` for a collection without rules and
    /// `operation_not_permitted` for `move`/`copy`.
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item_id))]
    pub fn project_patch(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
        patch: &PatchDocument,
    ) -> Result<PartialRecord, ValidationError> {
        self.rules(collection_id)
            .and_then(|_| match patch {
                PatchDocument::JsonPatch(operations) => PartialRecord::from_operations(operations),
                PatchDocument::MergePatch(document) => Ok(PartialRecord::from_merge_patch(document)),
            })
            .map_err(|r| reject(ctx, item_id, r))
    }

    /// Validate a projected patch.
    ///
    /// # Errors
    ///
    /// Returns `required_field_removed` when a required member is removed,
    /// and the usual extension, schema and vocabulary errors for the
    /// projection.
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item_id))]
    pub fn validate_partial(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
        partial: PartialRecord,
    ) -> Result<PartialRecord, ValidationError> {
        self.rules(collection_id)
            .and_then(|rules| Self::check_partial(rules, partial))
            .map_err(|r| reject(ctx, item_id, r))
    }

    /// Project and validate a JSON Patch in one step.
    ///
    /// # Errors
    ///
    /// Any error of [`Service::project_patch`] or
    /// [`Service::validate_partial`].
    pub fn validate_patch(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
        operations: &[PatchOperation],
    ) -> Result<PartialRecord, ValidationError> {
        let patch = PatchDocument::JsonPatch(operations.to_vec());
        let partial = self.project_patch(ctx, collection_id, item_id, &patch)?;
        self.validate_partial(ctx, collection_id, item_id, partial)
    }

    /// Project and validate an RFC 7386 merge patch in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Service::validate_patch`], except that every operation kind
    /// is expressible.
    pub fn validate_merge_patch(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
        patch: &Map<String, Value>,
    ) -> Result<PartialRecord, ValidationError> {
        self.rules(collection_id).map_err(|r| reject(ctx, item_id, r))?;
        self.validate_partial(ctx, collection_id, item_id, PartialRecord::from_merge_patch(patch))
    }

    fn check_partial(rules: &CollectionRules, partial: PartialRecord) -> Result<PartialRecord, Rejection> {
        let removed: Vec<ValidationIssue> = partial
            .nulled_fields()
            .iter()
            .filter(|pointer| Self::is_required(rules, pointer))
            .map(|pointer| {
                let name = stac::parse_pointer(pointer)
                    .ok()
                    .and_then(|segments| segments.last().cloned())
                    .unwrap_or_else(|| pointer.clone());
                ValidationIssue::new(
                    pointer.as_str(),
                    format!("Variable {name} is required and cannot be removed"),
                )
            })
            .collect();
        if !removed.is_empty() {
            return Err(Rejection::new(ValidationErrorKind::RequiredFieldRemoved, removed));
        }

        if let Some(declared) = partial.stac_extensions() {
            rules.extensions.check_declared(&declared)?;
        }

        let instance = Value::Object(partial.projection().clone());
        let issues: Vec<ValidationIssue> = rules
            .extensions
            .schemas()
            .flat_map(|schema| schema.validate_relaxed(&instance))
            .collect();
        if !issues.is_empty() {
            return Err(Rejection::new(ValidationErrorKind::Schema, issues));
        }

        if let Some(properties) = partial.properties() {
            let issues = rules.vocabulary.check_properties(properties);
            if !issues.is_empty() {
                return Err(Rejection::new(ValidationErrorKind::Vocabulary, issues));
            }
        }

        debug!(removed = partial.nulled_fields().len(), "patch validated");
        Ok(partial)
    }

    fn is_required(rules: &CollectionRules, pointer: &str) -> bool {
        let Ok(segments) = stac::parse_pointer(pointer) else {
            return false;
        };
        if let [top, name] = segments.as_slice()
            && top == "properties"
            && rules.vocabulary.is_required(name)
        {
            return true;
        }
        rules
            .extensions
            .schemas()
            .any(|schema| schema.requires(&segments))
    }

    /// Attributes of a record known only by its dataset identifier.
    ///
    /// # Errors
    ///
    /// Returns a vocabulary error when the identifier does not decompose
    /// into the collection's facets.
    pub fn identifier_facets(
        &self,
        ctx: &ValidationContext,
        collection_id: &str,
        item_id: &str,
    ) -> Result<Map<String, Value>, ValidationError> {
        self.rules(collection_id)
            .and_then(|rules| {
                rules
                    .vocabulary
                    .identifier_facets(item_id)
                    .map_err(|issues| Rejection::new(ValidationErrorKind::Vocabulary, issues))
            })
            .map_err(|r| reject(ctx, item_id, r))
    }
}

fn reject(ctx: &ValidationContext, item_id: &str, rejection: Rejection) -> ValidationError {
    let error = rejection.into_error(ctx, item_id);
    warn!(
        kind = error.kind.title(),
        issues = error.detail.errors.len(),
        "validation failed: {error}"
    );
    error
}
