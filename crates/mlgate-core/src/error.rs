//! Error taxonomy for the validation gate.
//!
//! Every failure the gate can produce maps onto one of three kinds that the
//! workflow engine branches on. Nothing here is recovered locally.

use serde::Serialize;
use thiserror::Error;

/// Coarse error kind reported to the invoking workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A lookup (log stream or log event) yielded nothing.
    #[serde(rename = "NotFoundError")]
    NotFound,

    /// A log line could not be parsed into a metric.
    #[serde(rename = "FormatError")]
    Format,

    /// The metric was observed but is below the required minimum.
    #[serde(rename = "ValidationFailedError")]
    ValidationFailed,
}

impl ErrorKind {
    /// Name used in error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Format => "FormatError",
            ErrorKind::ValidationFailed => "ValidationFailedError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a metric line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    /// The message has no `": "` delimiter.
    MissingDelimiter,

    /// The token after the delimiter is not a number.
    NotNumeric(String),
}

impl std::fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatIssue::MissingDelimiter => write!(f, "no ': ' delimiter"),
            FormatIssue::NotNumeric(token) => write!(f, "'{}' is not numeric", token),
        }
    }
}

/// Errors raised by the validation gate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("No log stream in '{log_group}' starts with '{prefix}'")]
    StreamNotFound { log_group: String, prefix: String },

    #[error("No event in '{log_group}/{log_stream}' matches pattern '{pattern}'")]
    MetricNotFound {
        log_group: String,
        log_stream: String,
        pattern: String,
    },

    #[error("Malformed metric line '{message}': {issue}")]
    Format { message: String, issue: FormatIssue },

    #[error("model not validated. metric_value: {metric_value} (minimum {minimum_value})")]
    ValidationFailed {
        metric_value: f64,
        minimum_value: f64,
    },
}

impl GateError {
    /// The kind the workflow engine branches on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::StreamNotFound { .. } | GateError::MetricNotFound { .. } => {
                ErrorKind::NotFound
            }
            GateError::Format { .. } => ErrorKind::Format,
            GateError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
        }
    }

    /// Observed metric value, present only on a rejected model.
    pub fn metric_value(&self) -> Option<f64> {
        match self {
            GateError::ValidationFailed { metric_value, .. } => Some(*metric_value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let not_found = GateError::StreamNotFound {
            log_group: "g".to_string(),
            prefix: "p".to_string(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.kind().as_str(), "NotFoundError");

        let format = GateError::Format {
            message: "accuracy=0.87".to_string(),
            issue: FormatIssue::MissingDelimiter,
        };
        assert_eq!(format.kind(), ErrorKind::Format);
        assert!(format.metric_value().is_none());
    }

    #[test]
    fn test_validation_failed_carries_value() {
        let err = GateError::ValidationFailed {
            metric_value: 50.0,
            minimum_value: 80.0,
        };
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.metric_value(), Some(50.0));
        assert!(err.to_string().contains("metric_value: 50"));
    }

    #[test]
    fn test_kind_serializes_as_error_type() {
        let json = serde_json::to_string(&ErrorKind::Format).unwrap();
        assert_eq!(json, "\"FormatError\"");
    }
}
