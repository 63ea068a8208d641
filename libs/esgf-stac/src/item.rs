//! STAC item model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A STAC item as submitted by a publisher.
///
/// Only the members the gateway inspects are typed; everything else
/// (`type`, `stac_version`, `geometry`, `bbox`, `links`, ...) is kept in
/// `extra` so the item is forwarded byte-for-byte equivalent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single asset of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// The project the item declares in `properties.project`.
    ///
    /// Some publishers send the project as a one-element list; the first
    /// element is used in that case.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        match self.properties.get("project")? {
            Value::String(project) => Some(project),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Asset references in asset-key order.
    pub fn asset_hrefs(&self) -> impl Iterator<Item = &str> {
        self.assets.values().map(|a| a.href.as_str())
    }

    /// The item as a JSON value, for schema validation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
