//! Configuration for the transaction gateway.
//!
//! Layers, later wins: built-in defaults, an optional YAML file, then
//! `ESGF_`-prefixed environment variables with `__` between nested keys
//! (`ESGF_AUTHZ__MODE=entitlement`).

use std::path::Path;

use anyhow::Context;
use authz_resolver::{AuthZResolverConfig, TokenValidatorConfig};
use event_stream::EventStreamConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use item_validator::ItemValidatorConfig;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "ESGF_";

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Token checks of this service.
    pub service: TokenValidatorConfig,
    pub authz: AuthZResolverConfig,
    pub validator: ItemValidatorConfig,
    pub event_stream: EventStreamConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Fails when `path` does not exist or a layer does not match the schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("configuration file {} not found", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use authz_resolver::AuthZMode;

    use super::*;

    #[test]
    fn defaults_load_without_file() {
        let cfg = AppConfig::load(None).unwrap();

        assert_eq!(cfg.authz.mode, AuthZMode::Group);
        assert_eq!(cfg.event_stream.topic, "esgf-local");
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.validator.collections.contains_key("CMIP6"));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "service:\n  client_id: client-1\nauthz:\n  mode: entitlement\n  entitlement:\n    basis_service: aai.egi.eu\nevent_stream:\n  topic: esgf-prod\nlogging:\n  format: json"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(cfg.service.client_id, "client-1");
        assert_eq!(cfg.service.issuer, "https://auth.globus.org");
        assert_eq!(cfg.authz.mode, AuthZMode::Entitlement);
        assert_eq!(cfg.authz.entitlement.basis_service.as_deref(), Some("aai.egi.eu"));
        assert_eq!(cfg.event_stream.topic, "esgf-prod");
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "authz:\n  policy_url: s3://bucket/policy.json").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();

        assert!(format!("{err:#}").contains("policy_url"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = AppConfig::load(Some(dir.path().join("absent.yaml").as_path())).unwrap_err();

        assert!(err.to_string().contains("not found"));
    }
}
