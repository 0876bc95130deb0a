//! mlgate CLI
//!
//! Runs the pipeline handlers from the command line. Each subcommand reads a
//! JSON event, prints the handler's JSON output on stdout and logs to
//! stderr.

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mlgate=info".parse()?)
                .add_directive("warn".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    let outcome = match cli.command {
        Commands::Validate(cmd) => commands::validate::execute(&config, cmd).await?,
        Commands::Initialise(cmd) => commands::initialise::execute(&config, cmd).await?,
        Commands::Notify(cmd) => commands::notify::execute(&config, cmd).await?,
        Commands::Endpoint(cmd) => commands::endpoint::execute(cmd)?,
        Commands::Backends(cmd) => commands::backends::execute(&config, cmd)?,
    };

    Ok(outcome.report())
}
