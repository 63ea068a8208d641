use http::StatusCode;
use item_validator::ErrorDetail;
use serde::Serialize;

use crate::domain::TransactionError;

const FORBIDDEN: &str = "Forbidden";

/// RFC 9457 problem details returned for a rejected transaction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    /// Itemized validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorDetail>,
}

impl Problem {
    #[must_use]
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_owned(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            errors: None,
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: ErrorDetail) -> Self {
        self.errors = Some(errors);
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Convert transaction errors to problem responses.
///
/// Group and token denials stay generic; role-grant denials name the missing
/// grant.
#[must_use]
pub fn transaction_error_to_problem(err: TransactionError) -> Problem {
    match err {
        TransactionError::InvalidRequest(message) => {
            Problem::new(StatusCode::BAD_REQUEST, "Bad Request", message)
        }

        TransactionError::Forbidden { reason } => {
            let detail = if reason.is_caller_visible() {
                reason.to_string()
            } else {
                FORBIDDEN.to_owned()
            };
            Problem::new(StatusCode::FORBIDDEN, FORBIDDEN, detail)
        }

        TransactionError::Validation(e) => {
            let detail = e.to_string();
            Problem::new(StatusCode::BAD_REQUEST, e.kind.title(), detail).with_errors(e.detail)
        }

        TransactionError::Dependency { service, cause } => {
            tracing::error!(%service, %cause, "dependency failure");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Dependency Failure",
                format!("{service} failed: {cause}"),
            )
        }

        TransactionError::Publish(e) => {
            tracing::error!(error = %e, "event delivery failed");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Event Delivery Failed",
                e.to_string(),
            )
        }
    }
}

impl From<TransactionError> for Problem {
    fn from(e: TransactionError) -> Self {
        transaction_error_to_problem(e)
    }
}
