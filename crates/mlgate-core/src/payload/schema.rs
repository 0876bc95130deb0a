//! JSON Schema validation for invocation payloads.
//!
//! Schemas live in `schemas/` and are embedded at compile time. Each one is
//! compiled once and reused.

use std::sync::OnceLock;
use thiserror::Error;

const VALIDATION_EVENT_SCHEMA_JSON: &str =
    include_str!("../../schemas/validation_event.schema.json");
const INITIALISE_EVENT_SCHEMA_JSON: &str =
    include_str!("../../schemas/initialise_event.schema.json");

static VALIDATION_EVENT_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();
static INITIALISE_EVENT_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Payload shapes with an embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    /// Model validation invocation
    ValidationEvent,
    /// Pipeline initialisation invocation
    InitialiseEvent,
}

impl PayloadSchema {
    fn source(&self) -> &'static str {
        match self {
            PayloadSchema::ValidationEvent => VALIDATION_EVENT_SCHEMA_JSON,
            PayloadSchema::InitialiseEvent => INITIALISE_EVENT_SCHEMA_JSON,
        }
    }

    fn cell(&self) -> &'static OnceLock<Result<jsonschema::Validator, String>> {
        match self {
            PayloadSchema::ValidationEvent => &VALIDATION_EVENT_SCHEMA,
            PayloadSchema::InitialiseEvent => &INITIALISE_EVENT_SCHEMA,
        }
    }
}

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator(schema: PayloadSchema) -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = schema.cell().get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(schema.source()) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Validate a payload against its schema.
///
/// Returns every violation found, each with the offending instance path.
pub fn validate_payload_schema(
    schema: PayloadSchema,
    payload: &serde_json::Value,
) -> Result<(), Vec<String>> {
    let validator = get_validator(schema).map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(payload)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
