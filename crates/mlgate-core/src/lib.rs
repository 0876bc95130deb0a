//! # mlgate-core
//!
//! Deterministic logic for an ML training pipeline's glue handlers.
//!
//! The centerpiece is the model-validation gate, which answers one question:
//! does the metric a training run reported clear the required minimum?
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: log retrieval lives in `mlgate-runtime`; this crate only
//!    parses and decides
//! 2. **Closed lower bound**: a metric exactly at the minimum passes
//! 3. **No silent defaults**: a missing or malformed metric is an error,
//!    never zero
//! 4. **Rejection is an error**: a failing model yields
//!    [`GateError::ValidationFailed`], never `validated: false`
//!
//! ## Example
//!
//! ```rust,ignore
//! use mlgate_core::{evaluate_metric_message, GateError};
//!
//! match evaluate_metric_message("val_acc: 0.912", 80.0) {
//!     Ok(result) => println!("validated at {}", result.metric_value),
//!     Err(GateError::ValidationFailed { metric_value, .. }) => {
//!         println!("rejected at {}", metric_value)
//!     }
//!     Err(e) => println!("could not evaluate: {}", e),
//! }
//! ```

pub mod deployment;
pub mod error;
pub mod metric;
pub mod naming;
pub mod notification;
pub mod payload;
pub mod threshold;
pub mod types;

// Re-export main types at crate root
pub use deployment::{DeploymentManifest, EndpointDeclaration, ManifestError};
pub use error::{ErrorKind, FormatIssue, GateError};
pub use metric::{parse_metric_message, METRIC_DELIMITER};
pub use naming::{hosted_model_name, training_job_name, validate_job_name};
pub use notification::{MessageStructure, Notification, COMPLETION_SUBJECT};
pub use payload::{InitialiseEvent, PayloadError, Threshold, ValidationEvent};
pub use threshold::check_threshold;
pub use types::{
    LogEventDescriptor, LogStreamDescriptor, MetricObservation, ValidationRequest,
    ValidationResult, PERCENT_SCALE,
};

/// Parse a metric line and apply the threshold in one step.
///
/// This is the decision half of the gate, for callers that already hold the
/// matching log message.
pub fn evaluate_metric_message(
    message: &str,
    minimum_value: f64,
) -> Result<ValidationResult, GateError> {
    let observation = parse_metric_message(message)?;
    check_threshold(observation, minimum_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_message() {
        let result = evaluate_metric_message("val_acc: 0.912", 80.0).unwrap();
        assert!(result.validated);
        assert!((result.metric_value - 91.2).abs() < 1e-9);
    }

    #[test]
    fn test_failing_message() {
        let result = evaluate_metric_message("val_acc: 0.5", 80.0);
        assert!(matches!(
            result,
            Err(GateError::ValidationFailed { metric_value, .. }) if metric_value == 50.0
        ));
    }

    #[test]
    fn test_malformed_message_is_not_zero() {
        let result = evaluate_metric_message("accuracy=0.87", 0.0);
        assert!(matches!(result, Err(GateError::Format { .. })));
    }
}
