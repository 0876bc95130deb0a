//! Invocation payloads sent by the workflow engine.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::schema::{validate_payload_schema, PayloadSchema};
use crate::types::ValidationRequest;

/// Errors that can occur when reading an invocation payload.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payload does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("Failed to parse payload: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid validation_minimum_value: '{0}'")]
    InvalidThreshold(String),

    #[error("Invalid training job name '{name}': {reason}")]
    InvalidJobName { name: String, reason: String },
}

/// `validation_minimum_value` arrives either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

impl Threshold {
    /// Numeric value of the threshold.
    pub fn value(&self) -> Result<f64, PayloadError> {
        match self {
            Threshold::Number(n) => Ok(*n),
            Threshold::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PayloadError::InvalidThreshold(s.clone())),
        }
    }
}

/// `training` section of a validation payload.
///
/// The workflow engine passes the full training job description; only the
/// job name is read.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSection {
    #[serde(rename = "TrainingJobName")]
    pub training_job_name: String,
}

/// `validation` section of a validation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationSection {
    pub log_group_name: String,
    pub validation_metric: String,
    pub validation_minimum_value: Threshold,
}

/// Payload for the model validation handler.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationEvent {
    pub training: TrainingSection,
    pub validation: ValidationSection,
}

impl ValidationEvent {
    /// Parse a payload after validating it against its schema.
    pub fn from_value(payload: &JsonValue) -> Result<Self, PayloadError> {
        validate_payload_schema(PayloadSchema::ValidationEvent, payload)
            .map_err(PayloadError::SchemaViolation)?;
        Ok(Self::deserialize(payload)?)
    }

    /// Parse a payload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Convert into an immutable gate request.
    pub fn into_request(self) -> Result<ValidationRequest, PayloadError> {
        let minimum_value = self.validation.validation_minimum_value.value()?;
        ValidationRequest::new(
            self.training.training_job_name,
            self.validation.log_group_name,
            self.validation.validation_metric,
            minimum_value,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelPrefixSection {
    pub model_prefix: String,
}

/// Payload for the initialise handler.
#[derive(Debug, Clone, Deserialize)]
pub struct InitialiseEvent {
    pub data: DataSection,

    /// Execution ARN of the workflow run
    pub execution: String,

    pub training: ModelPrefixSection,
}

impl InitialiseEvent {
    /// Parse a payload after validating it against its schema.
    pub fn from_value(payload: &JsonValue) -> Result<Self, PayloadError> {
        validate_payload_schema(PayloadSchema::InitialiseEvent, payload)
            .map_err(PayloadError::SchemaViolation)?;
        Ok(Self::deserialize(payload)?)
    }

    /// Last `:`-separated segment of the execution ARN.
    pub fn execution_id(&self) -> &str {
        self.execution.rsplit(':').next().unwrap_or(&self.execution)
    }
}
