//! `mlgate endpoint`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mlgate_core::{DeploymentManifest, EndpointDeclaration};

use super::Outcome;

/// Arguments for the endpoint command
#[derive(Args, Debug)]
pub struct EndpointCommands {
    /// Deployment manifest (JSON or YAML)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Target environment; left as a template parameter when omitted
    #[arg(long, env = "MLGATE_ENVIRONMENT")]
    pub environment: Option<String>,
}

pub fn execute(cmd: EndpointCommands) -> Result<Outcome> {
    let manifest = DeploymentManifest::from_file(&cmd.manifest)
        .with_context(|| format!("loading manifest {}", cmd.manifest.display()))?;
    let declaration = EndpointDeclaration::from_manifest(&manifest, cmd.environment.as_deref())?;

    if let Some(name) = declaration.model_name() {
        tracing::info!(model_name = %name, instances = declaration.instance_count(), "Declared endpoint");
    }
    Ok(Outcome::Output(declaration.to_template()))
}
