use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the `item_validator` module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemValidatorConfig {
    /// Reject records that omit a configured extension instead of adding it.
    pub strict_extensions: bool,

    /// Rules per collection id. Collections not listed are rejected.
    pub collections: BTreeMap<String, CollectionConfig>,
}

impl Default for ItemValidatorConfig {
    fn default() -> Self {
        Self {
            strict_extensions: false,
            collections: BTreeMap::from([
                ("CMIP6".to_owned(), CollectionConfig::cmip6()),
                ("CMIP7".to_owned(), CollectionConfig::cmip7()),
            ]),
        }
    }
}

/// Validation rules of one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Expected extensions, in the order defaults are appended.
    pub extensions: Vec<ExtensionConfig>,
    pub vocabulary: VocabularyConfig,
}

/// One expected STAC extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionConfig {
    pub name: String,
    /// Patterns a declared extension URL may match, e.g. any version.
    pub regex: Vec<String>,
    /// URL appended when the record does not declare the extension.
    pub default: String,
    pub schema: Option<SchemaSource>,
}

/// Where an extension's JSON schema comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// A schema shipped with the crate (`cmip6`).
    Builtin(String),
    Path(PathBuf),
    Inline(serde_json::Value),
}

/// Controlled-vocabulary rules of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VocabularyConfig {
    /// Facet names of the dataset identifier, in order. Empty disables
    /// identifier checks.
    pub id_facets: Vec<String>,
    pub separator: String,
    /// Properties a full record must carry and a patch must not remove.
    pub required_properties: Vec<String>,
    /// Closed value lists per facet.
    pub allowed_values: BTreeMap<String, Vec<String>>,
    /// Regular expressions per facet.
    pub patterns: BTreeMap<String, String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            id_facets: Vec::new(),
            separator: ".".to_owned(),
            required_properties: vec!["project".to_owned()],
            allowed_values: BTreeMap::new(),
            patterns: BTreeMap::new(),
        }
    }
}

const ALTERNATE_ASSETS_REGEX: &str =
    r"https://stac-extensions\.github\.io/alternate-assets/v[0-9]\.[0-9]\.[0-9]/schema\.json";
const ALTERNATE_ASSETS_DEFAULT: &str =
    "https://stac-extensions.github.io/alternate-assets/v1.2.0/schema.json";
const FILE_REGEX: &str = r"https://stac-extensions\.github\.io/file/v[0-9]\.[0-9]\.[0-9]/schema\.json";
const FILE_DEFAULT: &str = "https://stac-extensions.github.io/file/v2.1.0/schema.json";

impl CollectionConfig {
    fn common_extensions() -> [ExtensionConfig; 2] {
        [
            ExtensionConfig {
                name: "alternate_assets".to_owned(),
                regex: vec![ALTERNATE_ASSETS_REGEX.to_owned()],
                default: ALTERNATE_ASSETS_DEFAULT.to_owned(),
                schema: None,
            },
            ExtensionConfig {
                name: "file".to_owned(),
                regex: vec![FILE_REGEX.to_owned()],
                default: FILE_DEFAULT.to_owned(),
                schema: None,
            },
        ]
    }

    fn project_vocabulary(mip_era: &str) -> VocabularyConfig {
        VocabularyConfig {
            id_facets: [
                "mip_era",
                "activity_id",
                "institution_id",
                "source_id",
                "experiment_id",
                "member_id",
                "table_id",
                "variable_id",
                "grid_label",
                "version",
            ]
            .map(ToOwned::to_owned)
            .to_vec(),
            required_properties: [
                "project",
                "institution_id",
                "source_id",
                "experiment_id",
                "variable_id",
            ]
            .map(ToOwned::to_owned)
            .to_vec(),
            allowed_values: BTreeMap::from([("mip_era".to_owned(), vec![mip_era.to_owned()])]),
            patterns: BTreeMap::from([
                ("version".to_owned(), r"^v\d{8}$".to_owned()),
                ("member_id".to_owned(), r"^(s\d{4}-)?r\d+i\d+p\d+f\d+$".to_owned()),
                ("grid_label".to_owned(), r"^g[a-z0-9]+$".to_owned()),
            ]),
            ..VocabularyConfig::default()
        }
    }

    /// Built-in rules for CMIP6.
    #[must_use]
    pub fn cmip6() -> Self {
        let mut extensions = vec![ExtensionConfig {
            name: "CMIP6".to_owned(),
            regex: vec![
                r"https://stac-extensions\.github\.io/cmip6/v[0-9]\.[0-9]\.[0-9]/schema\.json"
                    .to_owned(),
            ],
            default: "https://stac-extensions.github.io/cmip6/v1.0.0/schema.json".to_owned(),
            schema: Some(SchemaSource::Builtin("cmip6".to_owned())),
        }];
        extensions.extend(Self::common_extensions());
        Self {
            extensions,
            vocabulary: Self::project_vocabulary("CMIP6"),
        }
    }

    /// Built-in rules for CMIP7.
    #[must_use]
    pub fn cmip7() -> Self {
        let mut extensions = vec![ExtensionConfig {
            name: "CMIP7".to_owned(),
            regex: vec![
                r"https://stac-extensions\.github\.io/cmip7/v[0-9]\.[0-9]\.[0-9]/schema\.json"
                    .to_owned(),
            ],
            default: "https://stac-extensions.github.io/cmip7/v1.0.0/schema.json".to_owned(),
            schema: None,
        }];
        extensions.extend(Self::common_extensions());
        Self {
            extensions,
            vocabulary: Self::project_vocabulary("CMIP7"),
        }
    }
}
