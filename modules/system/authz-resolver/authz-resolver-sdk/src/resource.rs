//! Description of the record an authorization decision is about.

use serde_json::{Map, Value};
use stac::Item;

use crate::error::AuthZResolverError;

/// The record being created, replaced, patched or deleted.
///
/// Constructing a descriptor from an item enforces that the item belongs to
/// the path collection, so an authorizer never sees a mismatched record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    collection_id: String,
    item_id: String,
    attributes: Map<String, Value>,
    asset_hrefs: Vec<String>,
}

impl ResourceDescriptor {
    /// Describe a full item submitted under `collection_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if `item.collection` or `item.properties.project`
    /// differs from `collection_id`.
    pub fn from_item(item: &Item, collection_id: &str) -> Result<Self, AuthZResolverError> {
        if item.collection.as_deref() != Some(collection_id) {
            return Err(AuthZResolverError::InvalidRequest(
                "Item collection must match path collection_id".to_owned(),
            ));
        }
        if item.project() != Some(collection_id) {
            return Err(AuthZResolverError::InvalidRequest(
                "Item project must match path collection_id".to_owned(),
            ));
        }

        Ok(Self {
            collection_id: collection_id.to_owned(),
            item_id: item.id.clone(),
            attributes: item.properties.clone(),
            asset_hrefs: item.asset_hrefs().map(ToOwned::to_owned).collect(),
        })
    }

    /// Describe a record known only by reference (patch, delete).
    ///
    /// `attributes` are typically derived from the dataset identifier; the
    /// `project` attribute is always the collection.
    #[must_use]
    pub fn for_reference(collection_id: &str, item_id: &str, mut attributes: Map<String, Value>) -> Self {
        attributes.insert("project".to_owned(), Value::String(collection_id.to_owned()));
        Self {
            collection_id: collection_id.to_owned(),
            item_id: item_id.to_owned(),
            attributes,
            asset_hrefs: Vec::new(),
        }
    }

    /// Add asset references touched by a partial update.
    #[must_use]
    pub fn with_asset_hrefs(mut self, hrefs: impl IntoIterator<Item = String>) -> Self {
        self.asset_hrefs.extend(hrefs);
        self
    }

    #[must_use]
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// The project of the record; equal to the collection by construction.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.collection_id
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Record attributes used for policy matching.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[must_use]
    pub fn asset_hrefs(&self) -> &[String] {
        &self.asset_hrefs
    }
}
