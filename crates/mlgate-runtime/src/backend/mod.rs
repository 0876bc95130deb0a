//! Logging backend abstractions.
//!
//! The gate reads training output through [`LogBackend`]. Implementations
//! are injected, so tests run against [`InMemoryLogBackend`] and deployments
//! against the logs service over HTTP.
//!
//! ## Security
//!
//! Backends that need a token use the [`secrets`] module. See
//! [`ApiCredential`] for the handling rules.

use async_trait::async_trait;
use thiserror::Error;

use mlgate_core::{LogEventDescriptor, LogStreamDescriptor};

mod factory;
mod memory;
pub mod secrets;

#[cfg(feature = "http")]
mod http;

pub use factory::{BackendFactory, BackendRegistry, MemoryBackendFactory};
pub use memory::{FilterPattern, FixtureStream, InMemoryLogBackend, LogFixture};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "http")]
pub use factory::HttpBackendFactory;
#[cfg(feature = "http")]
pub use http::{HttpLogBackend, LOGS_TOKEN_ENV};

/// Errors from logging backends.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

/// Read access to a logging backend.
///
/// Ordering of returned streams and events is whatever the backend
/// defines; callers must not assume recency.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// List streams in `log_group` whose name starts with `prefix`.
    async fn describe_log_streams(
        &self,
        log_group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStreamDescriptor>, BackendError>;

    /// List events in the given streams that match `filter_pattern`.
    ///
    /// An empty `log_stream_names` searches the whole group.
    async fn filter_log_events(
        &self,
        log_group: &str,
        log_stream_names: &[String],
        filter_pattern: &str,
    ) -> Result<Vec<LogEventDescriptor>, BackendError>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}
