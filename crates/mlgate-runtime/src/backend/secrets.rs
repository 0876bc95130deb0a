//! Credential handling for remote backends.
//!
//! Tokens are wrapped as soon as they are read so they never reach a log
//! line, a `Debug` dump or an error message.
//!
//! ```ignore
//! if let Some(token) = ApiCredential::lookup(&options, "token", "MLGATE_LOGS_TOKEN") {
//!     request = request.bearer_auth(token.expose());
//! }
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Config => "config",
            CredentialSource::Environment => "environment",
        })
    }
}

/// An access token. `Debug` never shows the value.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
        }
    }

    /// Look a token up under `config_key`, then in `env_var`.
    ///
    /// Returns `None` when neither is set; the token is optional.
    pub fn lookup(config: &JsonValue, config_key: &str, env_var: &str) -> Option<Self> {
        if let Some(value) = config[config_key].as_str() {
            return Some(Self::new(value, CredentialSource::Config));
        }
        std::env::var(env_var)
            .ok()
            .map(|value| Self::new(value, CredentialSource::Environment))
    }

    /// The raw token, for setting a header. Never store the result.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}
