//! Runtime configuration.
//!
//! Loaded from YAML or JSON. Anything not set falls back to defaults or to
//! the environment.
//!
//! ```yaml
//! backend:
//!   type: http
//!   options:
//!     endpoint: "https://logs.eu-west-1.example.internal"
//!     request_timeout: "30s"
//! notification:
//!   topic_arn: "arn:aws:sns:eu-west-1:123456789012:ml-team"
//!   timeout: "10s"
//! store:
//!   root: "/data/buckets"
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the notification topic.
pub const TOPIC_ARN_ENV: &str = "SNS_TOPIC_ARN";

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing setting: {0}")]
    Missing(String),
}

/// Which log backend to build, and its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registered backend type
    #[serde(rename = "type", default = "default_backend_type")]
    pub backend_type: String,

    /// Backend-specific options, passed to its factory
    #[serde(default = "empty_options")]
    pub options: JsonValue,
}

fn default_backend_type() -> String {
    "memory".to_string()
}

fn empty_options() -> JsonValue {
    JsonValue::Object(Default::default())
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: default_backend_type(),
            options: empty_options(),
        }
    }
}

/// Where completion notices go.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Topic to publish to; falls back to `SNS_TOPIC_ARN`
    #[serde(default)]
    pub topic_arn: Option<String>,

    /// Webhook receiving published notifications
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Webhook request timeout (e.g. "10s")
    #[serde(default, with = "duration_str")]
    pub timeout: Option<Duration>,
}

impl NotificationConfig {
    /// Resolve the topic from config or environment.
    pub fn topic_arn(&self) -> Result<String, ConfigError> {
        if let Some(topic) = &self.topic_arn {
            return Ok(topic.clone());
        }
        std::env::var(TOPIC_ARN_ENV).map_err(|_| {
            ConfigError::Missing(format!(
                "notification.topic_arn or {} environment variable",
                TOPIC_ARN_ENV
            ))
        })
    }
}

/// Local directory standing in for object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl RuntimeConfig {
    /// Parse from YAML (JSON is accepted too).
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML or JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }
}

mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
