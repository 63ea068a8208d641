#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Item Validator
//!
//! Validates records submitted for creation and the partial updates applied
//! to them, per collection:
//!
//! - declared STAC extensions against the collection's extension table,
//!   appending missing defaults unless strict mode is on
//! - the dataset identifier and properties against controlled vocabularies
//! - the record against each extension's JSON schema
//!
//! A JSON Patch or merge patch is first projected into a partial record.
//! Removed members are tracked separately, so removing a required member is
//! reported as `Variable <name> is required and cannot be removed` rather than
//! as a generic schema failure.

pub mod config;
pub mod domain;
pub mod module;

pub use config::{CollectionConfig, ExtensionConfig, ItemValidatorConfig, SchemaSource, VocabularyConfig};
pub use domain::{
    ErrorDetail, PartialRecord, Service, ValidationContext, ValidationError, ValidationErrorKind,
    ValidationIssue,
};
pub use module::ItemValidator;
