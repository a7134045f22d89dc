//! Schema Validator Port - Event payload validation interface.
//!
//! Events that enter the cascade path are checked against a schema before
//! they are decoded. The processor depends on this trait; the manual
//! validator adapter implements it.

use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Schemas known to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSchema {
    /// `milestone.status_changed` payload.
    MilestoneStatusChanged,
}

/// Port for validating event payloads.
///
/// Unknown extra fields are always permitted.
pub trait EventSchemaValidator: Send + Sync {
    fn validate(&self, schema: EventSchema, payload: &Value) -> Result<(), SchemaValidationError>;
}

/// Errors that can occur during schema validation.
#[derive(Debug, Clone, Error)]
pub enum SchemaValidationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid type for field {field}: expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field {field} must be a positive integer, got {value}")]
    NotPositive { field: String, value: String },

    #[error("Invalid format for field {field}: expected {format}")]
    InvalidFormat { field: String, format: String },

    #[error("Validation errors: {0:?}")]
    Multiple(Vec<SchemaValidationError>),
}

impl SchemaValidationError {
    /// Get the count of validation errors.
    pub fn error_count(&self) -> usize {
        match self {
            SchemaValidationError::Multiple(errors) => errors.len(),
            _ => 1,
        }
    }

    /// Returns the first offending field, for log correlation.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaValidationError::MissingRequired { field }
            | SchemaValidationError::InvalidType { field, .. }
            | SchemaValidationError::NotPositive { field, .. }
            | SchemaValidationError::InvalidFormat { field, .. } => Some(field),
            SchemaValidationError::Multiple(errors) => errors.first().and_then(|e| e.field()),
        }
    }
}

impl From<SchemaValidationError> for DomainError {
    fn from(err: SchemaValidationError) -> Self {
        let domain = DomainError::new(ErrorCode::ValidationFailed, err.to_string())
            .with_detail("error_count", err.error_count().to_string());
        match err.field() {
            Some(field) => domain.with_detail("field", field),
            None => domain,
        }
    }
}
