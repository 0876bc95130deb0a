//! Handler entry points invoked by the workflow engine.
//!
//! Each handler takes the raw JSON payload, does one job, and returns the
//! JSON the engine stores as the step's output. Failures come back as
//! [`RuntimeError`], which the caller renders with
//! [`RuntimeError::to_error_payload`].

use serde_json::Value as JsonValue;

use mlgate_core::{training_job_name, InitialiseEvent, Notification, ValidationEvent};

use crate::collaborators::{Notifier, ObjectStore};
use crate::gate::ValidationGate;
use crate::RuntimeError;

/// Validate a trained model against its metric threshold.
///
/// Returns `{"validated": "true", "metric_value": <number>}`. A model below
/// its minimum is an error, never `validated: false`.
pub async fn validate_model(
    gate: &ValidationGate,
    payload: &JsonValue,
) -> Result<JsonValue, RuntimeError> {
    let request = ValidationEvent::from_value(payload)?.into_request()?;
    let result = gate.validate(&request).await?;
    Ok(serde_json::to_value(result)?)
}

/// Check the input bucket and derive the training job name.
///
/// Returns the name as a JSON string.
pub async fn initialise(
    store: &dyn ObjectStore,
    payload: &JsonValue,
) -> Result<JsonValue, RuntimeError> {
    let event = InitialiseEvent::from_value(payload)?;

    let has_data = store.has_objects(&event.data.bucket).await?;
    if !has_data {
        tracing::error!(bucket = %event.data.bucket, store = store.name(), "No data found in bucket");
        return Err(RuntimeError::EmptyBucket(event.data.bucket));
    }

    let name = training_job_name(&event.training.model_prefix, event.execution_id())?;
    tracing::info!(training_job_name = %name, "Derived training job name");
    Ok(JsonValue::String(name))
}

/// Send the completion notice for a pipeline run.
///
/// The whole payload is included in the message. Returns `true`.
pub async fn notify_team(
    notifier: &dyn Notifier,
    topic_arn: &str,
    payload: &JsonValue,
) -> Result<JsonValue, RuntimeError> {
    let notification = Notification::process_completed(payload)?;
    notifier
        .publish(topic_arn, &notification)
        .await
        .map_err(|e| {
            tracing::error!(topic_arn, notifier = notifier.name(), error = %e, "Unable to notify team");
            e
        })?;

    tracing::info!(topic_arn, subject = %notification.subject, "Team notified");
    Ok(JsonValue::Bool(true))
}
