//! Item validator wiring.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tracing::info;

use crate::config::{CollectionConfig, ItemValidatorConfig, SchemaSource};
use crate::domain::{CollectionRules, ExtensionRule, ExtensionSet, SchemaValidator, Service, Vocabulary};

const CMIP6_SCHEMA: &str = include_str!("../schemas/cmip6.json");

/// Item validator module.
pub struct ItemValidator;

impl ItemValidator {
    /// Load extension schemas and compile the rules of every configured
    /// collection.
    ///
    /// # Errors
    ///
    /// Fails when a schema cannot be read or compiled, or a pattern is invalid.
    pub fn init(cfg: &ItemValidatorConfig) -> anyhow::Result<Arc<Service>> {
        info!("Initializing item_validator");

        let mut collections = BTreeMap::new();
        for (collection_id, collection) in &cfg.collections {
            let rules = Self::compile_collection(collection)
                .with_context(|| format!("collection '{collection_id}'"))?;
            collections.insert(collection_id.clone(), rules);
        }

        info!(
            collections = collections.len(),
            strict_extensions = cfg.strict_extensions,
            "Item validator initialized"
        );
        Ok(Arc::new(Service::new(collections, cfg.strict_extensions)))
    }

    fn compile_collection(cfg: &CollectionConfig) -> anyhow::Result<CollectionRules> {
        let rules = cfg
            .extensions
            .iter()
            .map(|ext| {
                let schema = ext
                    .schema
                    .as_ref()
                    .map(|source| {
                        let raw = load_schema(source)?;
                        SchemaValidator::compile(&ext.name, raw).map(Arc::new)
                    })
                    .transpose()?;
                ExtensionRule::compile(ext, schema)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(CollectionRules {
            extensions: ExtensionSet::new(rules),
            vocabulary: Vocabulary::from_config(&cfg.vocabulary)?,
        })
    }
}

fn load_schema(source: &SchemaSource) -> anyhow::Result<Value> {
    match source {
        SchemaSource::Builtin(name) => match name.as_str() {
            "cmip6" => serde_json::from_str(CMIP6_SCHEMA).context("builtin schema 'cmip6'"),
            other => anyhow::bail!("unknown builtin schema '{other}'"),
        },
        SchemaSource::Path(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse schema {}", path.display()))
        }
        SchemaSource::Inline(value) => Ok(value.clone()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::config::ExtensionConfig;
    use crate::domain::{ValidationContext, ValidationErrorKind};

    fn with_schema(source: SchemaSource) -> ItemValidatorConfig {
        let mut collection = CollectionConfig::cmip7();
        collection.extensions[0].schema = Some(source);
        ItemValidatorConfig {
            strict_extensions: false,
            collections: BTreeMap::from([("CMIP7".to_owned(), collection)]),
        }
    }

    #[test]
    fn init_with_defaults() {
        let service = ItemValidator::init(&ItemValidatorConfig::default()).unwrap();

        assert!(service.is_configured("CMIP6"));
        assert!(service.is_configured("CMIP7"));
        assert!(!service.is_configured("CMIP5"));
    }

    #[test]
    fn schema_is_loaded_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"properties": {{"properties": {{"required": ["retracted"]}}}}}}"#
        )
        .unwrap();

        let service = ItemValidator::init(&with_schema(SchemaSource::Path(file.path().into()))).unwrap();
        let ctx = ValidationContext {
            event_id: Uuid::nil(),
            request_id: "req-1".to_owned(),
        };
        let patch = json!({"properties": {"retracted": null}});

        let err = service
            .validate_merge_patch(
                &ctx,
                "CMIP7",
                "CMIP7.CMIP.NCAR.CESM3.historical.r1i1p1f1.Amon.tas.gn.v20250101",
                patch.as_object().unwrap(),
            )
            .unwrap_err();

        assert_eq!(err.kind, ValidationErrorKind::RequiredFieldRemoved);
    }

    #[test]
    fn unknown_builtin_schema_fails() {
        let err = ItemValidator::init(&with_schema(SchemaSource::Builtin("cmip9".to_owned())))
            .unwrap_err();

        assert!(format!("{err:#}").contains("unknown builtin schema 'cmip9'"));
    }

    #[test]
    fn invalid_extension_pattern_fails() {
        let mut cfg = with_schema(SchemaSource::Inline(json!({"type": "object"})));
        cfg.collections
            .get_mut("CMIP7")
            .unwrap()
            .extensions
            .push(ExtensionConfig {
                name: "broken".to_owned(),
                regex: vec!["(".to_owned()],
                ..ExtensionConfig::default()
            });

        let err = ItemValidator::init(&cfg).unwrap_err();

        assert!(format!("{err:#}").contains("invalid pattern for extension 'broken'"));
    }
}
