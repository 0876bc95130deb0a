//! `mlgate notify`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use mlgate_core::Notification;
use mlgate_runtime::{handlers, LogNotifier, Notifier, RuntimeConfig};

use super::{read_event, Outcome};

/// Arguments for the notify command
#[derive(Args, Debug)]
pub struct NotifyCommands {
    /// Run summary to include in the notice (JSON file, or `-` for stdin)
    #[arg(short, long)]
    pub event: PathBuf,

    /// Print the notice instead of publishing it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(config: &RuntimeConfig, cmd: NotifyCommands) -> Result<Outcome> {
    let payload = read_event(&cmd.event)?;

    if cmd.dry_run {
        let notification = Notification::process_completed(&payload)?;
        return Ok(Outcome::Output(serde_json::to_value(notification)?));
    }

    let topic_arn = config.notification.topic_arn()?;
    let notifier = build_notifier(config)?;
    Ok(Outcome::from_result(
        handlers::notify_team(notifier.as_ref(), &topic_arn, &payload).await,
    ))
}

#[cfg(feature = "http")]
fn build_notifier(config: &RuntimeConfig) -> Result<Box<dyn Notifier>> {
    match &config.notification.webhook_url {
        Some(url) => Ok(Box::new(mlgate_runtime::WebhookNotifier::new(
            url.clone(),
            config.notification.timeout,
        )?)),
        None => Ok(Box::new(LogNotifier)),
    }
}

#[cfg(not(feature = "http"))]
fn build_notifier(config: &RuntimeConfig) -> Result<Box<dyn Notifier>> {
    if config.notification.webhook_url.is_some() {
        tracing::warn!("webhook_url is set but this build lacks the http feature; logging instead");
    }
    Ok(Box::new(LogNotifier))
}
