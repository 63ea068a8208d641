//! Envelope construction.

use authz_resolver_sdk::AuthorizerResult;
use event_stream_sdk::{ChangeEvent, EventData, EventMetadata, Payload, PublisherInfo};
use time::OffsetDateTime;
use uuid::Uuid;

/// Builds envelopes; pure apart from id and clock reads.
#[derive(Debug, Clone)]
pub struct EnvelopeFactory {
    schema_version: String,
}

impl EnvelopeFactory {
    #[must_use]
    pub fn new(schema_version: impl Into<String>) -> Self {
        Self {
            schema_version: schema_version.into(),
        }
    }

    /// Request id from the inbound header, or a fresh one.
    #[must_use]
    pub fn request_id(header: Option<&str>) -> String {
        header
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned)
    }

    /// Assemble the envelope for an accepted request.
    #[must_use]
    pub fn build(
        &self,
        auth: AuthorizerResult,
        event_id: Uuid,
        request_id: String,
        user_agent: Option<&str>,
        payload: Payload,
    ) -> ChangeEvent {
        ChangeEvent {
            metadata: EventMetadata {
                auth,
                event_id,
                request_id,
                publisher: PublisherInfo::from_user_agent(user_agent),
                time: OffsetDateTime::now_utc(),
                schema_version: self.schema_version.clone(),
            },
            data: EventData::stac(payload),
        }
    }
}

impl Default for EnvelopeFactory {
    fn default() -> Self {
        Self::new(event_stream_sdk::SCHEMA_VERSION)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authz_resolver_sdk::{AuthBasisData, AuthBasisType, RequesterData};

    use super::*;

    fn auth() -> AuthorizerResult {
        AuthorizerResult {
            auth_policy_id: Some("ESGF-Publish-00012".to_owned()),
            client_id: None,
            requester_data: RequesterData::default(),
            auth_basis_data: AuthBasisData {
                authorization_basis_type: AuthBasisType::Entitlement,
                authorization_basis_service: "aai.egi.eu".to_owned(),
                authorization_basis: Vec::new(),
            },
        }
    }

    #[test]
    fn request_id_prefers_header() {
        assert_eq!(EnvelopeFactory::request_id(Some("req-42")), "req-42");

        let generated = EnvelopeFactory::request_id(Some("  "));
        assert!(Uuid::parse_str(&generated).is_ok());
        assert_ne!(generated, EnvelopeFactory::request_id(None));
    }

    #[test]
    fn build_fills_metadata() {
        let event_id = Uuid::new_v4();
        let event = EnvelopeFactory::default().build(
            auth(),
            event_id,
            "req-1".to_owned(),
            Some("esgcet/5.3.0"),
            Payload::Delete {
                collection_id: "CMIP6".to_owned(),
                item_id: "item-1".to_owned(),
            },
        );

        assert_eq!(event.metadata.event_id, event_id);
        assert_eq!(event.metadata.request_id, "req-1");
        assert_eq!(event.metadata.publisher.package, "esgcet");
        assert_eq!(event.metadata.schema_version, "1.0.0");
        assert_eq!(event.data.data_type, "STAC");
        assert!(event.metadata.time <= OffsetDateTime::now_utc());
    }
}
