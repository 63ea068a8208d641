//! Domain layer for the item validator.

pub mod error;
pub mod extensions;
pub mod projection;
pub mod schema;
pub mod service;
pub mod vocabulary;

pub use error::{ErrorDetail, ValidationContext, ValidationError, ValidationErrorKind, ValidationIssue};
pub use extensions::{ExtensionRule, ExtensionSet};
pub use projection::PartialRecord;
pub use schema::SchemaValidator;
pub use service::{CollectionRules, Service};
pub use vocabulary::Vocabulary;
