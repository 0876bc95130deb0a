//! CLI argument parsing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mlgate_runtime::RuntimeConfig;

use crate::commands::{
    backends::BackendsCommands, endpoint::EndpointCommands, initialise::InitialiseCommands,
    notify::NotifyCommands, validate::ValidateCommands,
};

/// mlgate
///
/// Pipeline handlers for training, validating and hosting a model.
#[derive(Parser, Debug)]
#[command(name = "mlgate")]
#[command(version)]
#[command(about = "Model validation gate and pipeline handlers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Runtime configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "MLGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the configuration file, or defaults when none is given.
    pub fn load_config(&self) -> Result<RuntimeConfig> {
        match &self.config {
            Some(path) => RuntimeConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(RuntimeConfig::default()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a trained model's metric against its minimum
    #[command(alias = "gate")]
    Validate(ValidateCommands),

    /// Check the input bucket and derive the training job name
    #[command(alias = "job-name")]
    Initialise(InitialiseCommands),

    /// Send the completion notice for a run
    Notify(NotifyCommands),

    /// Render the hosting endpoint template for a trained model
    Endpoint(EndpointCommands),

    /// Inspect available log backends
    Backends(BackendsCommands),
}
