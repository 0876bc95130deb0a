//! Metric extraction from training log lines.
//!
//! The training process prints lines such as `val_acc: 0.912`. The value is
//! the token right after the first `": "` delimiter.

use crate::error::{FormatIssue, GateError};
use crate::types::MetricObservation;

/// Delimiter between the metric label and its value.
pub const METRIC_DELIMITER: &str = ": ";

/// Parse a metric observation out of a log message.
///
/// The token following the first delimiter runs up to the next delimiter or
/// the end of the line, and is trimmed before parsing. Only finite numbers
/// are accepted; `inf` and `NaN` are format errors.
pub fn parse_metric_message(message: &str) -> Result<MetricObservation, GateError> {
    let token = message
        .split(METRIC_DELIMITER)
        .nth(1)
        .ok_or_else(|| GateError::Format {
            message: message.to_string(),
            issue: FormatIssue::MissingDelimiter,
        })?
        .trim();

    let raw_value = token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GateError::Format {
            message: message.to_string(),
            issue: FormatIssue::NotNumeric(token.to_string()),
        })?;

    let observation = MetricObservation::from_raw(raw_value);
    tracing::debug!(
        raw_value = observation.raw_value,
        scaled_value = observation.scaled_value,
        "Parsed metric line"
    );
    Ok(observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parses_and_scales() {
        let observation = parse_metric_message("accuracy: 0.87").unwrap();
        assert_eq!(observation.raw_value, 0.87);
        assert_eq!(observation.scaled_value, 87.0);
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        let observation = parse_metric_message("val_acc: 0.5\n").unwrap();
        assert_eq!(observation.scaled_value, 50.0);
    }

    #[test]
    fn test_value_stops_at_next_delimiter() {
        let observation = parse_metric_message("epoch 3 - val_acc: 0.75: done").unwrap();
        assert_eq!(observation.scaled_value, 75.0);
    }

    #[test]
    fn test_missing_delimiter_is_format_error() {
        let err = parse_metric_message("accuracy=0.87").unwrap_err();
        assert!(matches!(
            err,
            GateError::Format {
                issue: FormatIssue::MissingDelimiter,
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_token_is_format_error() {
        let err = parse_metric_message("val_acc: high").unwrap_err();
        match err {
            GateError::Format {
                issue: FormatIssue::NotNumeric(token),
                ..
            } => assert_eq!(token, "high"),
            other => panic!("Expected NotNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_values_are_format_errors() {
        for line in ["val_acc: inf", "val_acc: -infinity", "val_acc: NaN"] {
            let err = parse_metric_message(line).unwrap_err();
            assert!(
                matches!(
                    err,
                    GateError::Format {
                        issue: FormatIssue::NotNumeric(_),
                        ..
                    }
                ),
                "{line} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_token_is_format_error() {
        assert!(parse_metric_message("val_acc: ").is_err());
    }

    proptest! {
        #[test]
        fn prop_scaled_is_raw_times_hundred(raw in -10.0f64..10.0) {
            let message = format!("metric: {}", raw);
            let observation = parse_metric_message(&message).unwrap();
            prop_assert_eq!(observation.raw_value, raw);
            prop_assert_eq!(observation.scaled_value, raw * 100.0);
        }
    }
}
