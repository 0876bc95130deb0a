//! Logs service backend over the JSON 1.1 protocol.
//!
//! Requests are POSTed to a single endpoint with the operation named in the
//! `X-Amz-Target` header. Request signing is left to the endpoint (a signing
//! proxy, VPC gateway or local emulator); an optional bearer token is sent
//! when configured.
//!
//! ## Security
//!
//! The token is held in an [`ApiCredential`] and only exposed when the
//! `Authorization` header is set.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use mlgate_core::{LogEventDescriptor, LogStreamDescriptor};

use super::secrets::ApiCredential;
use super::{BackendError, LogBackend};

/// Environment variable holding the logs service token.
pub const LOGS_TOKEN_ENV: &str = "MLGATE_LOGS_TOKEN";

const TARGET_PREFIX: &str = "Logs_20140328";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const DEFAULT_MAX_PAGES: u32 = 10;

/// Logging backend talking to the logs service.
pub struct HttpLogBackend {
    endpoint: String,
    credential: Option<ApiCredential>,
    client: reqwest::Client,
    max_pages: u32,
}

impl std::fmt::Debug for HttpLogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLogBackend")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl HttpLogBackend {
    /// Create a backend for an endpoint, with an optional request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            credential: None,
            client,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Create from JSON configuration.
    ///
    /// Keys: `endpoint` (required), `token` (falls back to
    /// `MLGATE_LOGS_TOKEN`), `request_timeout` (e.g. `"30s"`), `max_pages`.
    pub fn from_config(config: &JsonValue) -> Result<Self, BackendError> {
        let endpoint = config["endpoint"]
            .as_str()
            .ok_or_else(|| BackendError::NotConfigured("http backend requires 'endpoint'".into()))?;

        let timeout = match config["request_timeout"].as_str() {
            Some(raw) => Some(humantime::parse_duration(raw).map_err(|e| {
                BackendError::NotConfigured(format!("invalid request_timeout '{}': {}", raw, e))
            })?),
            None => None,
        };

        let mut backend = Self::new(endpoint, timeout)?;

        backend.credential = ApiCredential::lookup(config, "token", LOGS_TOKEN_ENV);
        if let Some(credential) = &backend.credential {
            tracing::debug!(credential_source = %credential.source(), "Using logs service token");
        }

        if let Some(pages) = config["max_pages"].as_u64() {
            backend.max_pages = u32::try_from(pages).unwrap_or(u32::MAX).max(1);
        }

        Ok(backend)
    }

    async fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("x-amz-target", format!("{}.{}", TARGET_PREFIX, operation))
            .header("content-type", CONTENT_TYPE)
            .json(body);

        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| BackendError::HttpError(e.to_string()))?;
            // Proxies in front of the service answer with non-JSON bodies
            return Err(match serde_json::from_str::<ServiceError>(&body) {
                Ok(error) => error.into_backend_error(status.as_u16()),
                Err(_) => BackendError::ApiError {
                    status: status.as_u16(),
                    message: body,
                },
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeLogStreamsRequest<'a> {
    log_group_name: &'a str,
    log_stream_name_prefix: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeLogStreamsResponse {
    #[serde(default)]
    log_streams: Vec<LogStreamDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterLogEventsRequest<'a> {
    log_group_name: &'a str,
    #[serde(skip_serializing_if = "no_streams")]
    log_stream_names: &'a [String],
    filter_pattern: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

fn no_streams(names: &&[String]) -> bool {
    names.is_empty()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterLogEventsResponse {
    #[serde(default)]
    events: Vec<LogEventDescriptor>,
    next_token: Option<String>,
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

impl ServiceError {
    fn into_backend_error(self, status: u16) -> BackendError {
        if self.error_type.ends_with("ResourceNotFoundException") {
            BackendError::ResourceNotFound(self.message)
        } else {
            BackendError::ApiError {
                status,
                message: format!("{}: {}", self.error_type, self.message),
            }
        }
    }
}

#[async_trait]
impl LogBackend for HttpLogBackend {
    async fn describe_log_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStreamDescriptor>, BackendError> {
        let request = DescribeLogStreamsRequest {
            log_group_name: log_group,
            log_stream_name_prefix: prefix,
        };
        let response: DescribeLogStreamsResponse =
            self.call("DescribeLogStreams", &request).await?;
        Ok(response.log_streams)
    }

    async fn filter_log_events(
        &self,
        log_group: &str,
        log_stream_names: &[String],
        filter_pattern: &str,
    ) -> Result<Vec<LogEventDescriptor>, BackendError> {
        // The service may return empty pages with a token while it scans.
        let mut next_token = None;
        for page in 1..=self.max_pages {
            let request = FilterLogEventsRequest {
                log_group_name: log_group,
                log_stream_names,
                filter_pattern,
                next_token: next_token.take(),
            };
            let response: FilterLogEventsResponse =
                self.call("FilterLogEvents", &request).await?;

            if !response.events.is_empty() || response.next_token.is_none() {
                return Ok(response.events);
            }

            tracing::debug!(log_group, page, "Empty filter page, following next token");
            next_token = response.next_token;
        }

        tracing::warn!(
            log_group,
            max_pages = self.max_pages,
            "No matching events within page limit"
        );
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ValidationGate;
    use crate::testing::StubServer;
    use crate::RuntimeError;
    use mlgate_core::{GateError, ValidationRequest};
    use std::sync::Arc;

    #[test]
    fn test_from_config_requires_endpoint() {
        let result = HttpLogBackend::from_config(&serde_json::json!({}));
        assert!(matches!(result, Err(BackendError::NotConfigured(_))));
    }

    #[test]
    fn test_from_config_reads_options() {
        let backend = HttpLogBackend::from_config(&serde_json::json!({
            "endpoint": "http://localhost:4566",
            "token": "secret-token",
            "request_timeout": "30s",
            "max_pages": 3
        }))
        .unwrap();

        assert_eq!(backend.max_pages, 3);
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("localhost:4566"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = HttpLogBackend::from_config(&serde_json::json!({
            "endpoint": "http://localhost:4566",
            "request_timeout": "soon"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_bodies_use_wire_names() {
        let streams = vec!["job-123-a1b2".to_string()];
        let body = serde_json::to_value(FilterLogEventsRequest {
            log_group_name: "train-logs",
            log_stream_names: &streams,
            filter_pattern: "val_acc",
            next_token: None,
        })
        .unwrap();

        assert_eq!(body["logGroupName"], "train-logs");
        assert_eq!(body["logStreamNames"][0], "job-123-a1b2");
        assert_eq!(body["filterPattern"], "val_acc");
        assert!(body.get("nextToken").is_none());
    }

    #[tokio::test]
    async fn test_filter_follows_token_past_empty_page() {
        let server = StubServer::start(vec![
            (200, r#"{"events": [], "nextToken": "page-2"}"#),
            (
                200,
                r#"{"events": [{"message": "val_acc: 0.912", "timestamp": 1700000000000, "logStreamName": "job-123-a1b2"}], "nextToken": "page-3"}"#,
            ),
        ])
        .await;
        let backend = HttpLogBackend::new(server.url.clone(), None).unwrap();

        let events = backend
            .filter_log_events("train-logs", &["job-123-a1b2".to_string()], "val_acc")
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "val_acc: 0.912");

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].target.as_deref(),
            Some("Logs_20140328.FilterLogEvents")
        );
        assert!(requests[0].json().get("nextToken").is_none());
        assert_eq!(requests[1].json()["nextToken"], "page-2");
        assert_eq!(requests[1].json()["logStreamNames"][0], "job-123-a1b2");
    }

    #[tokio::test]
    async fn test_page_limit_surfaces_as_metric_not_found() {
        let server = StubServer::start(vec![
            (200, r#"{"logStreams": [{"logStreamName": "job-123-a1b2"}]}"#),
            (200, r#"{"events": [], "nextToken": "page-2"}"#),
            (200, r#"{"events": [], "nextToken": "page-3"}"#),
        ])
        .await;
        let backend = HttpLogBackend::from_config(&serde_json::json!({
            "endpoint": server.url,
            "max_pages": 2
        }))
        .unwrap();
        let gate = ValidationGate::new(Arc::new(backend));

        let request = ValidationRequest::new("job-123", "train-logs", "val_acc", 80.0).unwrap();
        let err = gate.validate(&request).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Gate(GateError::MetricNotFound { .. })
        ));

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0].target.as_deref(),
            Some("Logs_20140328.DescribeLogStreams")
        );
        assert_eq!(requests[0].json()["logStreamNamePrefix"], "job-123");
    }

    #[tokio::test]
    async fn test_missing_log_group_maps_to_resource_not_found() {
        let server = StubServer::start(vec![(
            400,
            r#"{"__type": "com.amazonaws.logs#ResourceNotFoundException", "message": "The specified log group does not exist."}"#,
        )])
        .await;
        let backend = HttpLogBackend::new(server.url.clone(), None).unwrap();

        let result = backend.describe_log_streams("missing", "job-123").await;
        assert!(matches!(result, Err(BackendError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn test_non_json_error_keeps_status() {
        let server = StubServer::start(vec![(502, "<html>Bad Gateway</html>")]).await;
        let backend = HttpLogBackend::new(server.url.clone(), None).unwrap();

        match backend.describe_log_streams("train-logs", "job-123").await {
            Err(BackendError::ApiError { status, message }) => {
                assert_eq!(status, 502);
                assert!(message.contains("Bad Gateway"));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let server = StubServer::start(vec![(200, r#"{"logStreams": []}"#)]).await;
        let backend = HttpLogBackend::from_config(&serde_json::json!({
            "endpoint": server.url,
            "token": "secret-token"
        }))
        .unwrap();

        let streams = backend.describe_log_streams("train-logs", "job").await.unwrap();
        assert!(streams.is_empty());
        assert_eq!(
            server.requests()[0].authorization.as_deref(),
            Some("Bearer secret-token")
        );
    }

    #[test]
    fn test_service_error_mapping() {
        let not_found: ServiceError = serde_json::from_value(serde_json::json!({
            "__type": "com.amazonaws.logs#ResourceNotFoundException",
            "message": "The specified log group does not exist."
        }))
        .unwrap();
        assert!(matches!(
            not_found.into_backend_error(400),
            BackendError::ResourceNotFound(_)
        ));

        let throttled: ServiceError = serde_json::from_value(serde_json::json!({
            "__type": "ThrottlingException",
            "Message": "Rate exceeded"
        }))
        .unwrap();
        assert!(matches!(
            throttled.into_backend_error(400),
            BackendError::ApiError { status: 400, .. }
        ));
    }
}
