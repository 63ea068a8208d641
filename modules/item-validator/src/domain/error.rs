use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Identifiers of the request being validated, echoed in every error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub event_id: Uuid,
    pub request_id: String,
}

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    UnknownCollection,
    UnexpectedExtensions,
    MissingExtensions,
    Vocabulary,
    Schema,
    OperationNotPermitted,
    InvalidPatchPath,
    RequiredFieldRemoved,
}

impl ValidationErrorKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::UnknownCollection => "collection is not configured",
            Self::UnexpectedExtensions => "unexpected extensions",
            Self::MissingExtensions => "missing extensions",
            Self::Vocabulary => "controlled vocabulary violation",
            Self::Schema => "schema validation failed",
            Self::OperationNotPermitted => "operation not permitted",
            Self::InvalidPatchPath => "invalid patch path",
            Self::RequiredFieldRemoved => "required field cannot be removed",
        }
    }
}

/// One itemized problem.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Where the problem is: a JSON pointer, extension or facet name.
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Structured detail returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub event_id: Uuid,
    pub request_id: String,
    pub item_id: String,
    pub errors: Vec<ValidationIssue>,
    pub status_code: u16,
    #[serde(rename = "type")]
    pub error_type: ValidationErrorKind,
}

/// A record or patch failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}: {}", .kind.title(), .detail.summary())]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub detail: ErrorDetail,
}

impl ValidationError {
    #[must_use]
    pub fn new(
        ctx: &ValidationContext,
        item_id: &str,
        kind: ValidationErrorKind,
        errors: Vec<ValidationIssue>,
    ) -> Self {
        Self {
            kind,
            detail: ErrorDetail {
                event_id: ctx.event_id,
                request_id: ctx.request_id.clone(),
                item_id: item_id.to_owned(),
                errors,
                status_code: 400,
                error_type: kind,
            },
        }
    }

    /// Messages of all issues.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.detail.errors.iter().map(|e| e.message.as_str())
    }
}

/// A failure found by one validation stage, before request identifiers are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub kind: ValidationErrorKind,
    pub issues: Vec<ValidationIssue>,
}

impl Rejection {
    pub(crate) fn new(kind: ValidationErrorKind, issues: Vec<ValidationIssue>) -> Self {
        Self { kind, issues }
    }

    pub(crate) fn single(
        kind: ValidationErrorKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind, vec![ValidationIssue::new(location, message)])
    }

    pub(crate) fn into_error(self, ctx: &ValidationContext, item_id: &str) -> ValidationError {
        ValidationError::new(ctx, item_id, self.kind, self.issues)
    }
}

impl ErrorDetail {
    fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_serializes_with_type_and_status() {
        let ctx = ValidationContext {
            event_id: Uuid::nil(),
            request_id: "req-1".to_owned(),
        };
        let err = ValidationError::new(
            &ctx,
            "item-1",
            ValidationErrorKind::UnexpectedExtensions,
            vec![ValidationIssue::new("stac_extensions", "https://example.org/x.json")],
        );

        assert_eq!(
            err.to_string(),
            "unexpected extensions: https://example.org/x.json"
        );
        assert_eq!(
            serde_json::to_value(&err.detail).unwrap(),
            json!({
                "event_id": "00000000-0000-0000-0000-000000000000",
                "request_id": "req-1",
                "item_id": "item-1",
                "errors": [{"location": "stac_extensions", "message": "https://example.org/x.json"}],
                "status_code": 400,
                "type": "unexpected_extensions"
            })
        );
    }
}
