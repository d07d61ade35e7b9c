//! Structural validation of inbound alert bodies.
//!
//! The JSON Schema is generated from [`AlertPayload`] and compiled once. Every
//! violation is collected so the caller can report them all in one response.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use super::app_service_health::AlertPayload;
use crate::{Error, Result};

/// Path reported for violations at the top of the document.
pub const ROOT_PATH: &str = "body";

/// A single structural or type mismatch in an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted field path, e.g. `data.essentials.firedDateTime`.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every violation found in a payload, in the order the validator reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&details)
    }
}

impl std::error::Error for ValidationError {}

pub struct AlertSchemaValidator {
    validator: Validator,
}

impl AlertSchemaValidator {
    pub fn new() -> Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(AlertPayload))?;
        let validator = Validator::new(&schema)
            .map_err(|e| Error::Schema(format!("Failed to compile alert schema: {}", e)))?;
        Ok(Self { validator })
    }

    /// Check `raw` against the alert schema and convert it to a typed payload.
    ///
    /// Unknown fields are ignored; `properties` and `webTestName` accept any value.
    pub fn validate(
        &self,
        raw: &Value,
    ) -> std::result::Result<AlertPayload, ValidationError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(raw)
            .map(|error| {
                let mut path = pointer_to_path(&error.instance_path.to_string());
                let reason = match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        let field = property
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| property.to_string());
                        path = join_path(&path, &field);
                        "Required".to_string()
                    }
                    _ => error.to_string(),
                };
                if path.is_empty() {
                    path = ROOT_PATH.to_string();
                }
                Violation { path, reason }
            })
            .collect();

        if !violations.is_empty() {
            debug!(
                "Alert payload failed schema validation with {} violations",
                violations.len()
            );
            return Err(ValidationError { violations });
        }

        serde_json::from_value(raw.clone()).map_err(|e| ValidationError {
            violations: vec![Violation {
                path: ROOT_PATH.to_string(),
                reason: e.to_string(),
            }],
        })
    }
}

/// `/data/allOf/0/name` -> `data.allOf.0.name`
fn pointer_to_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}
