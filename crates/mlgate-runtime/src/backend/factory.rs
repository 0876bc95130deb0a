//! Backend factory pattern for building log backends from configuration.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = BackendRegistry::with_defaults();
//! let backend = registry.create("memory", &serde_json::json!({ "fixture": "logs.yaml" }))?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::memory::{InMemoryLogBackend, LogFixture};
use super::{BackendError, LogBackend};

/// Factory for creating log backends from configuration.
pub trait BackendFactory: Send + Sync {
    /// Unique identifier for this backend type, e.g. "memory" or "http".
    fn backend_type(&self) -> &'static str;

    /// Create a backend instance from JSON options.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LogBackend>, BackendError>;

    /// Validate options without creating a backend.
    fn validate_config(&self, config: &JsonValue) -> Result<(), BackendError>;

    /// Human-readable description of this backend.
    fn description(&self) -> &'static str {
        "Log backend"
    }
}

/// Registry of available backend factories.
#[derive(Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, Arc<dyn BackendFactory>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any with the same type.
    pub fn register(&mut self, factory: Arc<dyn BackendFactory>) {
        self.factories
            .insert(factory.backend_type().to_string(), factory);
    }

    /// Create a backend from type name and options.
    pub fn create(
        &self,
        backend_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LogBackend>, BackendError> {
        self.factories
            .get(backend_type)
            .ok_or_else(|| BackendError::NotConfigured(format!(
                "Unknown backend type: '{}'. Available: {:?}",
                backend_type,
                self.available_types()
            )))?
            .create(config)
    }

    /// Validate options for a backend type.
    pub fn validate(&self, backend_type: &str, config: &JsonValue) -> Result<(), BackendError> {
        self.factories
            .get(backend_type)
            .ok_or_else(|| BackendError::NotConfigured(format!(
                "Unknown backend type: '{}'",
                backend_type
            )))?
            .validate_config(config)
    }

    /// List available backend types.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// (type, description) pairs for every registered backend.
    pub fn describe(&self) -> Vec<(&str, &'static str)> {
        self.factories
            .iter()
            .map(|(name, factory)| (name.as_str(), factory.description()))
            .collect()
    }

    pub fn has_backend(&self, backend_type: &str) -> bool {
        self.factories.contains_key(backend_type)
    }

    /// Registry with every built-in backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MemoryBackendFactory));
        #[cfg(feature = "http")]
        registry.register(Arc::new(HttpBackendFactory));
        registry
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.available_types())
            .finish()
    }
}

/// Builds an [`InMemoryLogBackend`].
///
/// Options: `fixture` (path to a YAML/JSON fixture) or inline `log_groups`
/// in fixture format. With neither, the backend starts empty.
pub struct MemoryBackendFactory;

impl MemoryBackendFactory {
    fn fixture(config: &JsonValue) -> Result<LogFixture, BackendError> {
        if let Some(path) = config["fixture"].as_str() {
            return LogFixture::from_file(path);
        }
        if config.get("log_groups").is_some() {
            return serde_json::from_value(config.clone())
                .map_err(|e| BackendError::ParseError(e.to_string()));
        }
        Ok(LogFixture::default())
    }
}

impl BackendFactory for MemoryBackendFactory {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LogBackend>, BackendError> {
        let fixture = Self::fixture(config)?;
        Ok(Arc::new(InMemoryLogBackend::from_fixture(&fixture)))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), BackendError> {
        Self::fixture(config).map(|_| ())
    }

    fn description(&self) -> &'static str {
        "In-memory log groups, optionally loaded from a fixture"
    }
}

/// Builds an [`HttpLogBackend`](super::HttpLogBackend).
#[cfg(feature = "http")]
pub struct HttpBackendFactory;

#[cfg(feature = "http")]
impl BackendFactory for HttpBackendFactory {
    fn backend_type(&self) -> &'static str {
        "http"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LogBackend>, BackendError> {
        Ok(Arc::new(super::HttpLogBackend::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), BackendError> {
        if config["endpoint"].as_str().is_none() {
            return Err(BackendError::NotConfigured(
                "http backend requires 'endpoint'".to_string(),
            ));
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Logs service over the JSON 1.1 protocol"
    }
}
