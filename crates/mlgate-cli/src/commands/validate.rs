//! `mlgate validate`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mlgate_runtime::{handlers, BackendRegistry, RuntimeConfig, ValidationGate};

use super::{read_event, Outcome};

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateCommands {
    /// Validation event (JSON file, or `-` for stdin)
    #[arg(short, long)]
    pub event: PathBuf,

    /// Override the configured backend type
    #[arg(long)]
    pub backend: Option<String>,
}

pub async fn execute(config: &RuntimeConfig, cmd: ValidateCommands) -> Result<Outcome> {
    let mut config = config.clone();
    if let Some(backend) = cmd.backend {
        config.backend.backend_type = backend;
    }

    let registry = BackendRegistry::with_defaults();
    let gate = ValidationGate::from_config(&config, &registry)
        .context("building log backend")?;
    tracing::debug!(backend = gate.backend_name(), "Log backend ready");

    let payload = read_event(&cmd.event)?;
    Ok(Outcome::from_result(
        handlers::validate_model(&gate, &payload).await,
    ))
}
