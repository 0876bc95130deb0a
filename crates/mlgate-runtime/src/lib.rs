//! # mlgate-runtime
//!
//! Collaborators and handler entry points for the mlgate pipeline.
//!
//! `mlgate-core` decides; this crate fetches. It owns the logging backend
//! the gate reads from, the object store and notifier the other handlers
//! use, and the configuration that wires them together.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mlgate_runtime::{handlers, InMemoryLogBackend, ValidationGate};
//!
//! let backend = InMemoryLogBackend::new();
//! backend.put_log_events("train-logs", "job-123-a1b2", ["val_acc: 0.912"]);
//! let gate = ValidationGate::new(Arc::new(backend));
//!
//! let output = handlers::validate_model(&gate, &payload).await?;
//! assert_eq!(output["validated"], "true");
//! ```

use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use mlgate_core::{ErrorKind, GateError, PayloadError};

pub mod backend;
pub mod collaborators;
pub mod config;
pub mod gate;
pub mod handlers;

#[cfg(all(test, feature = "http"))]
mod testing;

pub use backend::{
    ApiCredential, BackendError, BackendRegistry, CredentialSource, InMemoryLogBackend,
    LogBackend, LogFixture,
};
pub use collaborators::{
    CollaboratorError, InMemoryObjectStore, LocalObjectStore, LogNotifier, Notifier,
    ObjectStore, RecordingNotifier,
};
pub use config::{ConfigError, RuntimeConfig};
pub use gate::ValidationGate;

#[cfg(feature = "http")]
pub use backend::HttpLogBackend;
#[cfg(feature = "http")]
pub use collaborators::WebhookNotifier;

/// Errors returned by handlers.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Logging backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("no data found in bucket '{0}'")]
    EmptyBucket(String),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RuntimeError {
    /// Gate error kind, when the failure came from the gate itself.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RuntimeError::Gate(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Error type name reported to the workflow engine.
    pub fn error_type(&self) -> &'static str {
        match self {
            RuntimeError::Gate(e) => e.kind().as_str(),
            RuntimeError::Backend(_) => "BackendError",
            RuntimeError::Payload(_) => "PayloadError",
            RuntimeError::EmptyBucket(_) => "NoDataError",
            RuntimeError::Collaborator(_) => "CollaboratorError",
            RuntimeError::Serialization(_) => "SerializationError",
        }
    }

    /// Structured error object for the workflow engine to branch on.
    pub fn to_error_payload(&self) -> JsonValue {
        let mut payload = json!({
            "errorType": self.error_type(),
            "errorMessage": self.to_string(),
        });
        if let RuntimeError::Gate(e) = self {
            if let Some(value) = e.metric_value() {
                payload["metric_value"] = json!(value);
            }
        }
        payload
    }
}
