//! The transaction pipeline: authorize, validate, publish.

use std::sync::Arc;

use authz_resolver::TokenValidator;
use authz_resolver_sdk::{AuthorizerResult, ItemAuthorizer, ResourceDescriptor, Role};
use esgf_security::SecurityContext;
use event_stream::{EnvelopeFactory, EventStream};
use event_stream_sdk::Payload;
use http::StatusCode;
use item_validator::ValidationContext;
use serde::Serialize;
use stac::{Item, PatchDocument};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::TransactionError;

/// Request metadata taken from inbound headers.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// `X-Request-ID`
    pub request_id: Option<String>,
    /// `User-Agent`, expected as `package/version`.
    pub user_agent: Option<String>,
}

/// Response to an accepted transaction.
///
/// Acceptance means the change event was confirmed by the stream, not that
/// the change has been applied.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Accepted {
    pub message: String,
    pub event_id: Uuid,
    pub request_id: String,
    pub item_id: String,
}

impl Accepted {
    pub const STATUS: StatusCode = StatusCode::ACCEPTED;
}

/// STAC transaction service.
pub struct TransactionService {
    tokens: TokenValidator,
    authorizer: Arc<dyn ItemAuthorizer>,
    validator: Arc<item_validator::Service>,
    events: EventStream,
}

impl TransactionService {
    #[must_use]
    pub fn new(
        tokens: TokenValidator,
        authorizer: Arc<dyn ItemAuthorizer>,
        validator: Arc<item_validator::Service>,
        events: EventStream,
    ) -> Self {
        Self {
            tokens,
            authorizer,
            validator,
            events,
        }
    }

    /// Verify the `Authorization` header and return the caller's context.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a missing or rejected token, `Dependency` when the
    /// identity verifier failed.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<SecurityContext, TransactionError> {
        let bearer = TokenValidator::bearer_from_header(authorization)?;
        Ok(self.tokens.validate(bearer).await?)
    }

    /// `POST /collections/{collection_id}/items`
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the item's collection or project differs from
    /// `collection_id`; otherwise see [`TransactionError`].
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item.id))]
    pub async fn create_item(
        &self,
        ctx: &SecurityContext,
        meta: &RequestMeta,
        collection_id: &str,
        item: Item,
    ) -> Result<Accepted, TransactionError> {
        let vctx = Self::begin(meta);
        let resource = ResourceDescriptor::from_item(&item, collection_id)?;
        self.validator
            .ensure_configured(&vctx, collection_id, &item.id)?;

        let auth = self.authorize(ctx, &resource, Role::Create).await?;
        let item = self.validator.validate_create(&vctx, collection_id, item)?;

        self.publish(
            vctx,
            meta,
            auth,
            Payload::Create {
                collection_id: collection_id.to_owned(),
                item,
            },
        )
        .await
    }

    /// `PUT /collections/{collection_id}/items/{item_id}`
    ///
    /// # Errors
    ///
    /// As [`TransactionService::create_item`]; additionally `InvalidRequest`
    /// when the body's `id` differs from `item_id`.
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item_id))]
    pub async fn update_item(
        &self,
        ctx: &SecurityContext,
        meta: &RequestMeta,
        collection_id: &str,
        item_id: &str,
        item: Item,
    ) -> Result<Accepted, TransactionError> {
        let vctx = Self::begin(meta);
        if item.id != item_id {
            return Err(TransactionError::invalid_request(
                "Item id must match path item_id",
            ));
        }
        let resource = ResourceDescriptor::from_item(&item, collection_id)?;
        self.validator.ensure_configured(&vctx, collection_id, item_id)?;

        let auth = self.authorize(ctx, &resource, Role::Update).await?;
        let item = self.validator.validate_create(&vctx, collection_id, item)?;

        self.publish(
            vctx,
            meta,
            auth,
            Payload::Update {
                collection_id: collection_id.to_owned(),
                item_id: item_id.to_owned(),
                item,
            },
        )
        .await
    }

    /// `PATCH /collections/{collection_id}/items/{item_id}`
    ///
    /// The patch is projected before authorization, because the asset
    /// references it touches are part of what is authorized. Its content is
    /// validated only once the caller is authorized. The published event
    /// carries the patch document unchanged.
    ///
    /// # Errors
    ///
    /// See [`TransactionError`].
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item_id))]
    pub async fn patch_item(
        &self,
        ctx: &SecurityContext,
        meta: &RequestMeta,
        collection_id: &str,
        item_id: &str,
        patch: PatchDocument,
    ) -> Result<Accepted, TransactionError> {
        let vctx = Self::begin(meta);
        let attributes = self
            .validator
            .identifier_facets(&vctx, collection_id, item_id)?;
        let partial = self
            .validator
            .project_patch(&vctx, collection_id, item_id, &patch)?;

        let resource = ResourceDescriptor::for_reference(collection_id, item_id, attributes)
            .with_asset_hrefs(partial.asset_hrefs());
        let auth = self.authorize(ctx, &resource, Role::Update).await?;

        self.validator
            .validate_partial(&vctx, collection_id, item_id, partial)?;

        self.publish(
            vctx,
            meta,
            auth,
            Payload::Patch {
                collection_id: collection_id.to_owned(),
                item_id: item_id.to_owned(),
                patch,
            },
        )
        .await
    }

    /// `DELETE /collections/{collection_id}/items/{item_id}`
    ///
    /// # Errors
    ///
    /// See [`TransactionError`].
    #[tracing::instrument(skip_all, fields(collection = %collection_id, item = %item_id))]
    pub async fn delete_item(
        &self,
        ctx: &SecurityContext,
        meta: &RequestMeta,
        collection_id: &str,
        item_id: &str,
    ) -> Result<Accepted, TransactionError> {
        let vctx = Self::begin(meta);
        let attributes = self
            .validator
            .identifier_facets(&vctx, collection_id, item_id)?;

        let resource = ResourceDescriptor::for_reference(collection_id, item_id, attributes);
        let auth = self.authorize(ctx, &resource, Role::Delete).await?;

        self.publish(
            vctx,
            meta,
            auth,
            Payload::Delete {
                collection_id: collection_id.to_owned(),
                item_id: item_id.to_owned(),
            },
        )
        .await
    }

    fn begin(meta: &RequestMeta) -> ValidationContext {
        ValidationContext {
            event_id: Uuid::new_v4(),
            request_id: EnvelopeFactory::request_id(meta.request_id.as_deref()),
        }
    }

    async fn authorize(
        &self,
        ctx: &SecurityContext,
        resource: &ResourceDescriptor,
        role: Role,
    ) -> Result<AuthorizerResult, TransactionError> {
        self.authorizer
            .authorize(ctx, resource, role)
            .await
            .map_err(|e| {
                warn!(sub = ctx.subject(), role = %role, error = %e, "authorization failed");
                TransactionError::from(e)
            })
    }

    async fn publish(
        &self,
        vctx: ValidationContext,
        meta: &RequestMeta,
        auth: AuthorizerResult,
        payload: Payload,
    ) -> Result<Accepted, TransactionError> {
        let method = payload.method();
        let item_id = payload.item_id().to_owned();
        let ValidationContext {
            event_id,
            request_id,
        } = vctx;

        let event = self.events.envelopes.build(
            auth,
            event_id,
            request_id.clone(),
            meta.user_agent.as_deref(),
            payload,
        );
        let receipt = self
            .events
            .publisher
            .publish(&self.events.topic, &item_id, &event)
            .await?;

        info!(
            method,
            %event_id,
            request_id = %request_id,
            partition = receipt.partition,
            offset = receipt.offset,
            "transaction accepted"
        );
        Ok(Accepted {
            message: format!("{method} request accepted for processing"),
            event_id,
            request_id,
            item_id,
        })
    }
}
