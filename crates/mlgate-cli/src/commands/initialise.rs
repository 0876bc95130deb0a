//! `mlgate initialise`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use mlgate_runtime::{handlers, LocalObjectStore, RuntimeConfig};

use super::{read_event, Outcome};

/// Arguments for the initialise command
#[derive(Args, Debug)]
pub struct InitialiseCommands {
    /// Initialise event (JSON file, or `-` for stdin)
    #[arg(short, long)]
    pub event: PathBuf,

    /// Directory holding one sub-directory per bucket
    #[arg(long, env = "MLGATE_STORE_ROOT")]
    pub store_root: Option<PathBuf>,
}

pub async fn execute(config: &RuntimeConfig, cmd: InitialiseCommands) -> Result<Outcome> {
    let root = cmd.store_root.unwrap_or_else(|| config.store.root.clone());
    let store = LocalObjectStore::new(root);

    let payload = read_event(&cmd.event)?;
    Ok(Outcome::from_result(
        handlers::initialise(&store, &payload).await,
    ))
}
