//! The model-validation gate.
//!
//! One invocation is a single sequential pass:
//! 1. Resolve the training job's log stream by name prefix
//! 2. Pull the first log line matching the metric pattern
//! 3. Parse and scale the metric, then apply the threshold
//!
//! Each step's failure is logged and returned unchanged. There is no retry,
//! no caching of the stream lookup and no default value.

use std::sync::Arc;

use mlgate_core::{
    check_threshold, parse_metric_message, GateError, MetricObservation, ValidationRequest,
    ValidationResult,
};

use crate::backend::{BackendRegistry, LogBackend};
use crate::config::RuntimeConfig;
use crate::RuntimeError;

/// Decides whether a finished training job's metric clears its minimum.
pub struct ValidationGate {
    backend: Arc<dyn LogBackend>,
}

impl ValidationGate {
    pub fn new(backend: Arc<dyn LogBackend>) -> Self {
        Self { backend }
    }

    /// Build a gate with the backend named in the configuration.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &BackendRegistry,
    ) -> Result<Self, RuntimeError> {
        let backend = registry.create(&config.backend.backend_type, &config.backend.options)?;
        Ok(Self::new(backend))
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Find the log stream written by a training job.
    ///
    /// Takes the first stream, in backend order, whose name starts with
    /// `job_name`.
    pub async fn resolve_log_stream(
        &self,
        log_group: &str,
        job_name: &str,
    ) -> Result<String, RuntimeError> {
        tracing::info!(log_group, job_name, "Get log stream name from training job name");

        let streams = self
            .backend
            .describe_log_streams(log_group, job_name)
            .await
            .map_err(|e| {
                tracing::error!(log_group, job_name, error = %e, "Unable to list log streams");
                e
            })?;

        match streams.into_iter().next() {
            Some(stream) => {
                tracing::debug!(log_stream = %stream.log_stream_name, "Resolved log stream");
                Ok(stream.log_stream_name)
            }
            None => {
                tracing::error!(log_group, job_name, "Unable to get the log stream name");
                Err(GateError::StreamNotFound {
                    log_group: log_group.to_string(),
                    prefix: job_name.to_string(),
                }
                .into())
            }
        }
    }

    /// Read the metric from the first matching event in a stream.
    pub async fn extract_metric(
        &self,
        log_group: &str,
        log_stream: &str,
        metric_pattern: &str,
    ) -> Result<MetricObservation, RuntimeError> {
        let stream_names = [log_stream.to_string()];
        let events = self
            .backend
            .filter_log_events(log_group, &stream_names, metric_pattern)
            .await
            .map_err(|e| {
                tracing::error!(log_group, log_stream, error = %e, "Unable to filter log events");
                e
            })?;

        let event = events.into_iter().next().ok_or_else(|| {
            tracing::error!(log_group, log_stream, metric_pattern, "No metric line found");
            GateError::MetricNotFound {
                log_group: log_group.to_string(),
                log_stream: log_stream.to_string(),
                pattern: metric_pattern.to_string(),
            }
        })?;

        parse_metric_message(&event.message).map_err(|e| {
            tracing::error!(log_group, log_stream, error = %e, "Unable to parse metric line");
            e.into()
        })
    }

    /// Run the full gate for one request.
    pub async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResult, RuntimeError> {
        let log_stream = self
            .resolve_log_stream(request.log_group(), request.job_name())
            .await?;

        tracing::info!(log_stream = %log_stream, "Evaluating model");
        let observation = self
            .extract_metric(request.log_group(), &log_stream, request.metric_name())
            .await?;

        match check_threshold(observation, request.minimum_value()) {
            Ok(result) => {
                tracing::info!(
                    job_name = request.job_name(),
                    metric_value = result.metric_value,
                    minimum_value = request.minimum_value(),
                    "Model validated"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(
                    job_name = request.job_name(),
                    metric_value = observation.scaled_value,
                    minimum_value = request.minimum_value(),
                    "Model not validated"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryLogBackend};
    use mlgate_core::ErrorKind;

    fn gate_with(backend: InMemoryLogBackend) -> ValidationGate {
        ValidationGate::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_resolve_takes_first_prefix_match() {
        let backend = InMemoryLogBackend::new();
        backend.put_log_events("train-logs", "job-123-first", ["a"]);
        backend.put_log_events("train-logs", "job-123-second", ["b"]);
        let gate = gate_with(backend);

        let stream = gate.resolve_log_stream("train-logs", "job-123").await.unwrap();
        assert_eq!(stream, "job-123-first");
    }

    #[tokio::test]
    async fn test_resolve_without_match_is_not_found() {
        let backend = InMemoryLogBackend::new();
        backend.put_log_events("train-logs", "other-job", ["a"]);
        let gate = gate_with(backend);

        let err = gate.resolve_log_stream("train-logs", "job-123").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_extract_without_events_is_not_found() {
        let backend = InMemoryLogBackend::new();
        backend.put_log_events("train-logs", "job-123-a", ["loss: 0.3"]);
        let gate = gate_with(backend);

        let err = gate
            .extract_metric("train-logs", "job-123-a", "val_acc")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Gate(GateError::MetricNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_malformed_line_is_format_error() {
        let backend = InMemoryLogBackend::new();
        backend.put_log_events("train-logs", "job-123-a", ["accuracy=0.87"]);
        let gate = gate_with(backend);

        let err = gate
            .extract_metric("train-logs", "job-123-a", "accuracy")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Format));
    }

    #[tokio::test]
    async fn test_extract_scales_first_match() {
        let backend = InMemoryLogBackend::new();
        backend.put_log_events(
            "train-logs",
            "job-123-a",
            ["accuracy: 0.87", "accuracy: 0.99"],
        );
        let gate = gate_with(backend);

        let observation = gate
            .extract_metric("train-logs", "job-123-a", "accuracy")
            .await
            .unwrap();
        assert_eq!(observation.scaled_value, 87.0);
    }

    #[tokio::test]
    async fn test_backend_errors_propagate_unchanged() {
        let gate = gate_with(InMemoryLogBackend::new());
        let request = ValidationRequest::new("job-123", "missing", "val_acc", 80.0).unwrap();

        let err = gate.validate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Backend(BackendError::ResourceNotFound(_))
        ));
        assert_eq!(gate.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_from_config_uses_registry() {
        let config = RuntimeConfig::from_yaml(
            r#"
backend:
  type: memory
  options:
    log_groups:
      train-logs:
        - name: job-7-x
          events: ["val_acc: 0.95"]
"#,
        )
        .unwrap();
        let gate = ValidationGate::from_config(&config, &BackendRegistry::with_defaults()).unwrap();

        let request = ValidationRequest::new("job-7", "train-logs", "val_acc", 90.0).unwrap();
        let result = gate.validate(&request).await.unwrap();
        assert_eq!(result.metric_value, 95.0);
    }
}
