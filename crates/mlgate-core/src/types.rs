//! Core types shared by the gate, the log backends and the handlers.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::payload::PayloadError;

/// Factor applied to a raw metric to put it on the percentage scale.
pub const PERCENT_SCALE: f64 = 100.0;

/// A request to validate one training run.
///
/// Fields are private so a request cannot change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    job_name: String,
    log_group: String,
    metric_name: String,
    minimum_value: f64,
}

impl ValidationRequest {
    /// Build a request. `job_name` must be non-empty.
    pub fn new(
        job_name: impl Into<String>,
        log_group: impl Into<String>,
        metric_name: impl Into<String>,
        minimum_value: f64,
    ) -> Result<Self, PayloadError> {
        let job_name = job_name.into();
        if job_name.is_empty() {
            return Err(PayloadError::MissingField(
                "training.TrainingJobName".to_string(),
            ));
        }

        Ok(Self {
            job_name,
            log_group: log_group.into(),
            metric_name: metric_name.into(),
            minimum_value,
        })
    }

    /// Training job name, used as the log stream prefix.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Log group the training job writes to.
    pub fn log_group(&self) -> &str {
        &self.log_group
    }

    /// Filter pattern selecting the metric line.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Minimum accepted value, percentage scale.
    pub fn minimum_value(&self) -> f64 {
        self.minimum_value
    }
}

/// A metric parsed out of a log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricObservation {
    /// Value as written by the training process
    pub raw_value: f64,

    /// `raw_value` on the percentage scale
    pub scaled_value: f64,
}

impl MetricObservation {
    /// Scale a raw value onto the percentage scale.
    pub fn from_raw(raw_value: f64) -> Self {
        Self {
            raw_value,
            scaled_value: raw_value * PERCENT_SCALE,
        }
    }
}

/// Outcome of a passing validation.
///
/// Only ever constructed for a model that cleared its threshold; a rejected
/// model is reported through [`GateError::ValidationFailed`](crate::GateError).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationResult {
    #[serde(serialize_with = "bool_as_string")]
    pub validated: bool,

    pub metric_value: f64,
}

impl ValidationResult {
    /// Result for a model that passed with the given value.
    pub fn passed(metric_value: f64) -> Self {
        Self {
            validated: true,
            metric_value,
        }
    }
}

// The workflow engine compares `validated` against the string "true".
fn bool_as_string<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "true" } else { "false" })
}

/// A log stream as listed by the logging backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStreamDescriptor {
    pub log_stream_name: String,

    /// Creation time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,

    /// Timestamp of the newest event, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_timestamp: Option<i64>,
}

impl LogStreamDescriptor {
    /// Descriptor with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            log_stream_name: name.into(),
            creation_time: None,
            last_event_timestamp: None,
        }
    }

    /// Creation time as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time.and_then(millis_to_utc)
    }
}

/// A log event returned by a filter query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventDescriptor {
    pub message: String,

    /// Event time, epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stream_name: Option<String>,
}

impl LogEventDescriptor {
    /// Event with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            log_stream_name: None,
        }
    }

    /// Event time as a UTC timestamp.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(millis_to_utc)
    }
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
