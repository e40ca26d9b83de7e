use serde::Serialize;

use crate::error::ApiError;

/// A field-level validation error.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Payload of `ApiError::Validation`: a human-readable summary plus the
/// individual field failures.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ValidationErrorResponse {
    /// Name of every field that failed, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Run garde validation on `value`, turning a failed report into an
/// `ApiError::Validation` whose top-level message is `summary`.
pub fn validate<T>(value: &T, summary: &str) -> Result<(), ApiError>
where
    T: garde::Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| ApiError::Validation(convert_garde_report(&report, summary)))
}

fn convert_garde_report(report: &garde::Report, summary: &str) -> ValidationErrorResponse {
    let errors = report
        .iter()
        .map(|(path, error)| {
            let field = path.to_string();
            FieldError {
                field: if field.is_empty() { "value".to_string() } else { field },
                message: error.message().to_string(),
                code: "validation".to_string(),
            }
        })
        .collect();

    ValidationErrorResponse {
        message: summary.to_string(),
        errors,
    }
}

// Re-export garde::Validate for convenience.
pub use garde::Validate;
