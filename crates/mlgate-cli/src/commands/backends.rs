//! `mlgate backends`

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use mlgate_runtime::{BackendRegistry, RuntimeConfig};

use super::Outcome;

/// Arguments for the backends command
#[derive(Args, Debug)]
pub struct BackendsCommands {
    #[command(subcommand)]
    pub action: BackendsAction,
}

#[derive(Subcommand, Debug)]
pub enum BackendsAction {
    /// List registered backend types
    List,
    /// Check the configured backend's options
    Check,
}

pub fn execute(config: &RuntimeConfig, cmd: BackendsCommands) -> Result<Outcome> {
    let registry = BackendRegistry::with_defaults();

    match cmd.action {
        BackendsAction::List => {
            let backends: Vec<_> = registry
                .describe()
                .into_iter()
                .map(|(name, description)| json!({ "type": name, "description": description }))
                .collect();
            Ok(Outcome::Output(json!(backends)))
        }
        BackendsAction::Check => {
            registry.validate(&config.backend.backend_type, &config.backend.options)?;
            Ok(Outcome::Output(json!({
                "type": config.backend.backend_type,
                "valid": true
            })))
        }
    }
}
