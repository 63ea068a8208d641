//! Logging initialisation.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a global subscriber was already installed.
///
/// # Errors
///
/// Fails when the configured level is not a valid filter directive.
pub fn init_tracing(cfg: &LoggingConfig) -> anyhow::Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid log level '{}'", cfg.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = match cfg.format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    Ok(installed)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_not_an_error() {
        let cfg = LoggingConfig::default();

        let _ = init_tracing(&cfg).unwrap();
        assert!(!init_tracing(&cfg).unwrap());
    }
}
