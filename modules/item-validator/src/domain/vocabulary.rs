//! Controlled-vocabulary rules of a collection.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Context;
use regex::Regex;
use serde_json::{Map, Value};
use stac::Item;

use crate::config::VocabularyConfig;
use crate::domain::error::ValidationIssue;

#[derive(Debug)]
pub struct Vocabulary {
    id_facets: Vec<String>,
    separator: String,
    required: Vec<String>,
    allowed: BTreeMap<String, BTreeSet<String>>,
    patterns: BTreeMap<String, Regex>,
}

impl Vocabulary {
    /// # Errors
    ///
    /// Returns an error if a facet pattern is not a valid regular expression
    /// or the identifier separator is empty.
    pub fn from_config(cfg: &VocabularyConfig) -> anyhow::Result<Self> {
        if !cfg.id_facets.is_empty() && cfg.separator.is_empty() {
            anyhow::bail!("identifier separator must not be empty");
        }

        let patterns = cfg
            .patterns
            .iter()
            .map(|(facet, pattern)| {
                Regex::new(pattern)
                    .with_context(|| format!("invalid pattern for facet '{facet}'"))
                    .map(|re| (facet.clone(), re))
            })
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            id_facets: cfg.id_facets.clone(),
            separator: cfg.separator.clone(),
            required: cfg.required_properties.clone(),
            allowed: cfg
                .allowed_values
                .iter()
                .map(|(facet, values)| (facet.clone(), values.iter().cloned().collect()))
                .collect(),
            patterns,
        })
    }

    /// Whether `property` must be present and may not be removed.
    #[must_use]
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Split a dataset identifier into its named facets.
    ///
    /// # Errors
    ///
    /// Returns the issues found when the facet count is wrong or a facet value
    /// is outside its vocabulary.
    pub fn identifier_facets(&self, item_id: &str) -> Result<Map<String, Value>, Vec<ValidationIssue>> {
        if self.id_facets.is_empty() {
            return Ok(Map::new());
        }

        let values: Vec<&str> = item_id.split(self.separator.as_str()).collect();
        if values.len() != self.id_facets.len() {
            return Err(vec![ValidationIssue::new(
                "id",
                format!(
                    "identifier '{item_id}' has {} facets, expected {} ({})",
                    values.len(),
                    self.id_facets.len(),
                    self.id_facets.join(&self.separator)
                ),
            )]);
        }

        let issues: Vec<ValidationIssue> = self
            .id_facets
            .iter()
            .zip(&values)
            .filter_map(|(facet, value)| self.check_value(facet, value))
            .collect();
        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(self
            .id_facets
            .iter()
            .zip(values)
            .map(|(facet, value)| (facet.clone(), Value::String(value.to_owned())))
            .collect())
    }

    fn check_value(&self, facet: &str, value: &str) -> Option<ValidationIssue> {
        if let Some(allowed) = self.allowed.get(facet)
            && !allowed.contains(value)
        {
            return Some(ValidationIssue::new(
                facet,
                format!("'{value}' is not an allowed value for {facet}"),
            ));
        }
        if let Some(pattern) = self.patterns.get(facet)
            && !pattern.is_match(value)
        {
            return Some(ValidationIssue::new(
                facet,
                format!("'{value}' does not match the pattern for {facet}"),
            ));
        }
        None
    }

    /// Check the vocabulary-controlled properties that are present.
    ///
    /// Absent properties are not reported here; string lists are checked
    /// element by element and other JSON types are left to the schema.
    #[must_use]
    pub fn check_properties(&self, properties: &Map<String, Value>) -> Vec<ValidationIssue> {
        properties
            .iter()
            .filter(|(name, _)| self.allowed.contains_key(*name) || self.patterns.contains_key(*name))
            .flat_map(|(name, value)| {
                let values: Vec<&str> = match value {
                    Value::String(s) => vec![s.as_str()],
                    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                    _ => Vec::new(),
                };
                values
                    .into_iter()
                    .filter_map(|v| self.check_value(name, v))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Check a complete record: identifier facets, their agreement with the
    /// same-named properties, required properties and property values.
    #[must_use]
    pub fn check_item(&self, item: &Item) -> Vec<ValidationIssue> {
        let mut issues = match self.identifier_facets(&item.id) {
            Ok(facets) => Self::check_consistency(&facets, &item.properties),
            Err(issues) => issues,
        };

        issues.extend(
            self.required
                .iter()
                .filter(|name| !item.properties.contains_key(*name))
                .map(|name| {
                    ValidationIssue::new(
                        format!("/properties/{name}"),
                        format!("missing required property {name}"),
                    )
                }),
        );
        issues.extend(self.check_properties(&item.properties));
        issues
    }

    fn check_consistency(
        facets: &Map<String, Value>,
        properties: &Map<String, Value>,
    ) -> Vec<ValidationIssue> {
        facets
            .iter()
            .filter_map(|(facet, expected)| {
                let expected = expected.as_str()?;
                let agrees = match properties.get(facet)? {
                    Value::String(actual) => actual == expected,
                    Value::Array(actual) => actual.iter().any(|v| v.as_str() == Some(expected)),
                    _ => false,
                };
                (!agrees).then(|| {
                    ValidationIssue::new(
                        format!("/properties/{facet}"),
                        format!("property {facet} does not match identifier facet '{expected}'"),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::CollectionConfig;

    const ID: &str = "CMIP6.CMIP.NCAR.CESM2.historical.r1i1p1f1.Amon.tas.gn.v20190308";

    fn cmip6() -> Vocabulary {
        Vocabulary::from_config(&CollectionConfig::cmip6().vocabulary).unwrap()
    }

    fn item(id: &str, properties: Value) -> Item {
        serde_json::from_value(json!({"id": id, "properties": properties})).unwrap()
    }

    #[test]
    fn identifier_decomposes_into_named_facets() {
        let facets = cmip6().identifier_facets(ID).unwrap();

        assert_eq!(facets["institution_id"], json!("NCAR"));
        assert_eq!(facets["member_id"], json!("r1i1p1f1"));
        assert_eq!(facets["version"], json!("v20190308"));
    }

    #[test]
    fn wrong_facet_count_is_reported_once() {
        let issues = cmip6().identifier_facets("CMIP6.CMIP.NCAR").unwrap_err();

        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("has 3 facets, expected 10"));
    }

    #[test]
    fn unknown_facet_values_are_rejected() {
        let issues = cmip6()
            .identifier_facets("CMIP5.CMIP.NCAR.CESM2.historical.r1i1p1f1.Amon.tas.gn.20190308")
            .unwrap_err();

        assert_eq!(
            issues.iter().map(|i| i.location.as_str()).collect::<Vec<_>>(),
            vec!["mip_era", "version"]
        );
    }

    #[test]
    fn empty_facet_list_disables_identifier_checks() {
        let vocabulary = Vocabulary::from_config(&VocabularyConfig::default()).unwrap();

        assert!(vocabulary.identifier_facets("anything").unwrap().is_empty());
    }

    #[test]
    fn item_properties_must_agree_with_identifier() {
        let issues = cmip6().check_item(&item(
            ID,
            json!({
                "project": "CMIP6",
                "institution_id": "IPSL",
                "source_id": "CESM2",
                "experiment_id": "historical",
                "variable_id": "tas",
                "activity_id": ["CMIP"]
            }),
        ));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "/properties/institution_id");
    }

    #[test]
    fn absent_optional_facets_do_not_fail() {
        let issues = cmip6().check_item(&item(
            ID,
            json!({
                "project": "CMIP6",
                "institution_id": "NCAR",
                "source_id": "CESM2",
                "experiment_id": "historical",
                "variable_id": "tas"
            }),
        ));

        assert!(issues.is_empty());
    }

    #[test]
    fn missing_required_properties_are_listed() {
        let issues = cmip6().check_item(&item(ID, json!({"project": "CMIP6"})));

        assert_eq!(
            issues.iter().map(|i| i.message.as_str()).collect::<Vec<_>>(),
            vec![
                "missing required property institution_id",
                "missing required property source_id",
                "missing required property experiment_id",
                "missing required property variable_id",
            ]
        );
    }

    #[test]
    fn property_lists_are_checked_element_by_element() {
        let issues = cmip6().check_properties(
            json!({"mip_era": ["CMIP6", "CMIP5"], "grid_label": 7})
                .as_object()
                .unwrap(),
        );

        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("'CMIP5'"));
    }
}
