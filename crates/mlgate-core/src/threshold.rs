//! The threshold decision.

use crate::error::GateError;
use crate::types::{MetricObservation, ValidationResult};

/// Decide whether an observation clears the minimum.
///
/// The bound is closed: a value exactly at `minimum_value` passes. A NaN
/// observation never passes.
pub fn check_threshold(
    observation: MetricObservation,
    minimum_value: f64,
) -> Result<ValidationResult, GateError> {
    if observation.scaled_value >= minimum_value {
        Ok(ValidationResult::passed(observation.scaled_value))
    } else {
        Err(GateError::ValidationFailed {
            metric_value: observation.scaled_value,
            minimum_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundary_passes() {
        let result = check_threshold(MetricObservation::from_raw(0.8), 80.0).unwrap();
        assert!(result.validated);
        assert_eq!(result.metric_value, 80.0);
    }

    #[test]
    fn test_below_minimum_fails_with_value() {
        let err = check_threshold(MetricObservation::from_raw(0.5), 80.0).unwrap_err();
        assert_eq!(
            err,
            GateError::ValidationFailed {
                metric_value: 50.0,
                minimum_value: 80.0,
            }
        );
    }

    #[test]
    fn test_nan_never_passes() {
        let observation = MetricObservation::from_raw(f64::NAN);
        assert!(check_threshold(observation, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_passes_iff_at_least_minimum(v in -1000.0f64..1000.0, m in -1000.0f64..1000.0) {
            let observation = MetricObservation { raw_value: v / 100.0, scaled_value: v };
            let result = check_threshold(observation, m);
            prop_assert_eq!(result.is_ok(), v >= m);
        }

        #[test]
        fn prop_equal_value_passes(m in -1000.0f64..1000.0) {
            let observation = MetricObservation { raw_value: m / 100.0, scaled_value: m };
            prop_assert!(check_threshold(observation, m).is_ok());
        }
    }
}
