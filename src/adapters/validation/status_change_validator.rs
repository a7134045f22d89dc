//! Status Change Validator - Implementation of EventSchemaValidator.
//!
//! Manual validation of the `milestone.status_changed` payload:
//!
//! | Field             | Rule                                   |
//! |-------------------|----------------------------------------|
//! | `projectId`       | required, positive integer             |
//! | `userId`          | required, positive integer             |
//! | `initiatorUserId` | required, positive integer             |
//! | `projectName`     | optional string                        |
//! | `projectUrl`      | optional string, `http(s)://host...`   |
//! | `timeline`, `originalMilestone`, `updatedMilestone` | required objects |
//!
//! Additional properties are allowed everywhere.

use serde_json::{Map, Value};

use crate::ports::{EventSchema, EventSchemaValidator, SchemaValidationError};

const POSITIVE_INTEGER_FIELDS: [&str; 3] = ["projectId", "userId", "initiatorUserId"];
const OBJECT_FIELDS: [&str; 3] = ["timeline", "originalMilestone", "updatedMilestone"];

/// Validator for status-change payloads.
///
/// Stateless; `Send + Sync` and cheap to share.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusChangeValidator;

impl StatusChangeValidator {
    pub fn new() -> Self {
        Self
    }

    fn validate_status_change(&self, payload: &Value) -> Result<(), SchemaValidationError> {
        let obj = require_object(payload, "root")?;
        let mut errors = Vec::new();

        for field in POSITIVE_INTEGER_FIELDS {
            if let Err(e) = require_positive_integer(obj, field) {
                errors.push(e);
            }
        }

        if let Some(name) = present(obj, "projectName") {
            if !name.is_string() {
                errors.push(invalid_type("projectName", "string", name));
            }
        }

        if let Some(url) = present(obj, "projectUrl") {
            match url.as_str() {
                Some(s) if is_http_url(s) => {}
                Some(_) => errors.push(SchemaValidationError::InvalidFormat {
                    field: "projectUrl".to_string(),
                    format: "http(s) url".to_string(),
                }),
                None => errors.push(invalid_type("projectUrl", "string", url)),
            }
        }

        for field in OBJECT_FIELDS {
            match obj.get(field) {
                None => errors.push(SchemaValidationError::MissingRequired {
                    field: field.to_string(),
                }),
                Some(value) if !value.is_object() => {
                    errors.push(invalid_type(field, "object", value))
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(collect_errors(errors))
        }
    }
}

impl EventSchemaValidator for StatusChangeValidator {
    fn validate(&self, schema: EventSchema, payload: &Value) -> Result<(), SchemaValidationError> {
        match schema {
            EventSchema::MilestoneStatusChanged => self.validate_status_change(payload),
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

/// Returns the field unless it is absent or null.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn require_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a Map<String, Value>, SchemaValidationError> {
    value
        .as_object()
        .ok_or_else(|| invalid_type(path, "object", value))
}

fn require_positive_integer(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<(), SchemaValidationError> {
    let value = obj
        .get(field)
        .ok_or_else(|| SchemaValidationError::MissingRequired {
            field: field.to_string(),
        })?;

    if let Some(n) = value.as_i64() {
        if n > 0 {
            return Ok(());
        }
        return Err(SchemaValidationError::NotPositive {
            field: field.to_string(),
            value: n.to_string(),
        });
    }
    if value.is_u64() {
        // Larger than i64::MAX; positive but not representable as an id.
        return Err(SchemaValidationError::InvalidFormat {
            field: field.to_string(),
            format: "64-bit integer".to_string(),
        });
    }
    Err(invalid_type(field, "integer", value))
}

/// `http://` or `https://` followed by a non-empty host and no whitespace.
fn is_http_url(s: &str) -> bool {
    let Some(rest) = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
    else {
        return false;
    };
    let Some(first) = rest.chars().next() else {
        return false;
    };
    !matches!(first, '/' | '$' | '.' | '?' | '#')
        && rest.chars().count() >= 2
        && !rest.chars().any(char::is_whitespace)
}

fn invalid_type(field: &str, expected: &str, actual: &Value) -> SchemaValidationError {
    SchemaValidationError::InvalidType {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: type_name(actual).to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn collect_errors(mut errors: Vec<SchemaValidationError>) -> SchemaValidationError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        SchemaValidationError::Multiple(errors)
    }
}
