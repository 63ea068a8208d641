//! Expected STAC extensions of a collection.

use std::sync::Arc;

use anyhow::Context;
use regex::Regex;

use crate::config::ExtensionConfig;
use crate::domain::error::{Rejection, ValidationErrorKind, ValidationIssue};
use crate::domain::schema::SchemaValidator;

/// One expected extension with its accepted URL patterns.
#[derive(Debug)]
pub struct ExtensionRule {
    name: String,
    patterns: Vec<Regex>,
    default: String,
    schema: Option<Arc<SchemaValidator>>,
}

impl ExtensionRule {
    /// Compile the rule. Patterns are anchored so they must match the whole URL.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid regular expression.
    pub fn compile(
        cfg: &ExtensionConfig,
        schema: Option<Arc<SchemaValidator>>,
    ) -> anyhow::Result<Self> {
        let mut patterns = cfg
            .regex
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{p})$"))
                    .with_context(|| format!("invalid pattern for extension '{}'", cfg.name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if patterns.is_empty() && !cfg.default.is_empty() {
            patterns.push(Regex::new(&format!("^{}$", regex::escape(&cfg.default)))?);
        }

        Ok(Self {
            name: cfg.name.clone(),
            patterns,
            default: cfg.default.clone(),
            schema,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> Option<&SchemaValidator> {
        self.schema.as_deref()
    }

    fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(url))
    }
}

/// The extension table of one collection, in configuration order.
#[derive(Debug, Default)]
pub struct ExtensionSet {
    rules: Vec<ExtensionRule>,
}

impl ExtensionSet {
    #[must_use]
    pub fn new(rules: Vec<ExtensionRule>) -> Self {
        Self { rules }
    }

    /// Extension schemas to validate records against.
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaValidator> {
        self.rules.iter().filter_map(ExtensionRule::schema)
    }

    /// Reject declared URLs that match no rule.
    pub(crate) fn check_declared(&self, declared: &[String]) -> Result<(), Rejection> {
        let unexpected: Vec<ValidationIssue> = declared
            .iter()
            .filter(|url| !self.rules.iter().any(|r| r.matches(url)))
            .map(|url| ValidationIssue::new("stac_extensions", url.as_str()))
            .collect();

        if unexpected.is_empty() {
            Ok(())
        } else {
            Err(Rejection::new(
                ValidationErrorKind::UnexpectedExtensions,
                unexpected,
            ))
        }
    }

    /// Bring a record's declared extensions in line with the table.
    ///
    /// Unknown URLs are rejected. A configured extension the record does not
    /// declare is appended with its default URL, or reported as missing when
    /// `strict` is set.
    pub(crate) fn normalize(&self, declared: &[String], strict: bool) -> Result<Vec<String>, Rejection> {
        self.check_declared(declared)?;

        let absent: Vec<&ExtensionRule> = self
            .rules
            .iter()
            .filter(|rule| !declared.iter().any(|url| rule.matches(url)))
            .collect();

        if strict && !absent.is_empty() {
            return Err(Rejection::new(
                ValidationErrorKind::MissingExtensions,
                absent
                    .iter()
                    .map(|rule| ValidationIssue::new("stac_extensions", rule.name.as_str()))
                    .collect(),
            ));
        }

        let mut normalized = declared.to_vec();
        normalized.extend(absent.iter().map(|rule| rule.default.clone()));
        Ok(normalized)
    }
}
