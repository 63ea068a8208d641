//! Gateway wiring.

use std::sync::Arc;

use authz_resolver::{TokenValidator, build_authorizer};
use authz_resolver_sdk::{GroupMembershipSource, IdentityVerifier};
use event_stream::EventStream;
use event_stream_sdk::StreamTransport;
use item_validator::ItemValidator;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::TransactionService;

/// External collaborators of the gateway.
pub struct Collaborators {
    pub identity: Arc<dyn IdentityVerifier>,
    /// Required in group mode.
    pub memberships: Option<Arc<dyn GroupMembershipSource>>,
    /// Broker transport; the configured built-in transport is used when absent.
    pub transport: Option<Arc<dyn StreamTransport>>,
}

/// STAC transaction gateway.
pub struct StacTransaction;

impl StacTransaction {
    /// Build every component once; the result is shared across requests.
    ///
    /// # Errors
    ///
    /// Fails when the policy, a schema or a pattern cannot be loaded, or
    /// group mode is configured without a membership source.
    pub fn init(cfg: &AppConfig, collaborators: Collaborators) -> anyhow::Result<TransactionService> {
        info!("Initializing stac_transaction");

        let tokens = TokenValidator::new(collaborators.identity, cfg.service.clone());
        let authorizer = build_authorizer(&cfg.authz, collaborators.memberships)?;
        let validator = ItemValidator::init(&cfg.validator)?;
        let events = EventStream::init(&cfg.event_stream, collaborators.transport);

        info!(
            mode = cfg.authz.mode.as_str(),
            topic = %cfg.event_stream.topic,
            "stac_transaction initialized"
        );
        Ok(TransactionService::new(tokens, authorizer, validator, events))
    }
}
