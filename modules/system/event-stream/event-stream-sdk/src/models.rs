//! Change-event envelope.
//!
//! Field names and the `method` tag values are the wire contract consumed by
//! downstream processors.

use authz_resolver_sdk::AuthorizerResult;
use serde::{Deserialize, Serialize};
use stac::{Item, PatchDocument};
use time::OffsetDateTime;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "1.0.0";
pub const DATA_TYPE: &str = "STAC";
pub const DATA_VERSION: &str = "1.0.0";

/// One accepted create, update, patch or delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    pub metadata: EventMetadata,
    pub data: EventData,
}

impl ChangeEvent {
    /// Ordering key of the event: the record identifier.
    #[must_use]
    pub fn key(&self) -> &str {
        self.data.payload.item_id()
    }
}

/// Audit metadata of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventMetadata {
    pub auth: AuthorizerResult,
    pub event_id: Uuid,
    pub request_id: String,
    pub publisher: PublisherInfo,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub schema_version: String,
}

/// Client software that submitted the change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublisherInfo {
    pub package: String,
    pub version: String,
}

impl PublisherInfo {
    /// Split a `package/version` user agent; missing parts are empty.
    #[must_use]
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let user_agent = user_agent.unwrap_or_default().trim();
        let (package, version) = user_agent.split_once('/').unwrap_or((user_agent, ""));
        let version = version.split_whitespace().next().unwrap_or_default();
        Self {
            package: package.to_owned(),
            version: version.to_owned(),
        }
    }
}

/// Event body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventData {
    #[serde(rename = "type")]
    pub data_type: String,
    pub version: String,
    pub payload: Payload,
}

impl EventData {
    #[must_use]
    pub fn stac(payload: Payload) -> Self {
        Self {
            data_type: DATA_TYPE.to_owned(),
            version: DATA_VERSION.to_owned(),
            payload,
        }
    }
}

/// Operation-specific payload, tagged by HTTP method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method")]
pub enum Payload {
    #[serde(rename = "POST")]
    Create { collection_id: String, item: Item },

    #[serde(rename = "PUT")]
    Update {
        collection_id: String,
        item_id: String,
        item: Item,
    },

    #[serde(rename = "PATCH")]
    Patch {
        collection_id: String,
        item_id: String,
        patch: PatchDocument,
    },

    #[serde(rename = "DELETE")]
    Delete {
        collection_id: String,
        item_id: String,
    },
}

impl Payload {
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Create { .. } => "POST",
            Self::Update { .. } => "PUT",
            Self::Patch { .. } => "PATCH",
            Self::Delete { .. } => "DELETE",
        }
    }

    #[must_use]
    pub fn collection_id(&self) -> &str {
        match self {
            Self::Create { collection_id, .. }
            | Self::Update { collection_id, .. }
            | Self::Patch { collection_id, .. }
            | Self::Delete { collection_id, .. } => collection_id,
        }
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        match self {
            Self::Create { item, .. } => &item.id,
            Self::Update { item_id, .. }
            | Self::Patch { item_id, .. }
            | Self::Delete { item_id, .. } => item_id,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authz_resolver_sdk::{AuthBasisData, AuthBasisType, RequesterData};
    use serde_json::json;
    use stac::PatchOperation;

    use super::*;

    fn auth() -> AuthorizerResult {
        AuthorizerResult {
            auth_policy_id: None,
            client_id: None,
            requester_data: RequesterData {
                sub: "sub-1".to_owned(),
                iss: "https://auth.globus.org".to_owned(),
                ..RequesterData::default()
            },
            auth_basis_data: AuthBasisData {
                authorization_basis_type: AuthBasisType::Group,
                authorization_basis_service: "groups.globus.org".to_owned(),
                authorization_basis: Vec::new(),
            },
        }
    }

    fn event(payload: Payload) -> ChangeEvent {
        ChangeEvent {
            metadata: EventMetadata {
                auth: auth(),
                event_id: Uuid::nil(),
                request_id: "req-1".to_owned(),
                publisher: PublisherInfo::from_user_agent(Some("esgcet/5.3.0")),
                time: OffsetDateTime::UNIX_EPOCH,
                schema_version: SCHEMA_VERSION.to_owned(),
            },
            data: EventData::stac(payload),
        }
    }

    #[test]
    fn envelope_has_expected_wire_shape() {
        let value = serde_json::to_value(event(Payload::Delete {
            collection_id: "CMIP6".to_owned(),
            item_id: "item-1".to_owned(),
        }))
        .unwrap();

        assert_eq!(value["metadata"]["event_id"], json!("00000000-0000-0000-0000-000000000000"));
        assert_eq!(value["metadata"]["time"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(value["metadata"]["publisher"], json!({"package": "esgcet", "version": "5.3.0"}));
        assert_eq!(value["metadata"]["schema_version"], json!("1.0.0"));
        assert_eq!(value["metadata"]["auth"]["requester_data"]["sub"], json!("sub-1"));
        assert_eq!(
            value["data"],
            json!({
                "type": "STAC",
                "version": "1.0.0",
                "payload": {"method": "DELETE", "collection_id": "CMIP6", "item_id": "item-1"}
            })
        );
    }

    #[test]
    fn patch_payload_carries_document() {
        let event = event(Payload::Patch {
            collection_id: "CMIP6".to_owned(),
            item_id: "item-1".to_owned(),
            patch: PatchDocument::JsonPatch(vec![PatchOperation::Remove {
                path: "/properties/retracted".to_owned(),
            }]),
        });

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value["data"]["payload"]["patch"],
            json!([{"op": "remove", "path": "/properties/retracted"}])
        );
        assert_eq!(event.key(), "item-1");
        assert_eq!(event.data.payload.method(), "PATCH");
    }

    #[test]
    fn create_payload_is_keyed_by_item_id() {
        let item: Item = serde_json::from_value(json!({"id": "item-9", "collection": "CMIP6"})).unwrap();
        let event = event(Payload::Create {
            collection_id: "CMIP6".to_owned(),
            item,
        });

        assert_eq!(event.key(), "item-9");
        assert_eq!(event.data.payload.collection_id(), "CMIP6");
    }

    #[test]
    fn publisher_tolerates_partial_user_agent() {
        assert_eq!(PublisherInfo::from_user_agent(None), PublisherInfo::default());
        assert_eq!(
            PublisherInfo::from_user_agent(Some("curl")),
            PublisherInfo {
                package: "curl".to_owned(),
                version: String::new(),
            }
        );
        assert_eq!(
            PublisherInfo::from_user_agent(Some("esgcet/5.3.0 python-requests/2.32")).version,
            "5.3.0"
        );
    }
}
