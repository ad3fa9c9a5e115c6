//! CLI entry and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use slk_core::RemoteClient;
use slk_slack::SlackClient;
use tracing::info;

use crate::config::{self, Config};
use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "slk")]
#[command(version)]
#[command(about = "Terminal Slack client")]
struct Cli {
    /// Path to the credentials file (default: ~/.slk.json)
    #[arg(long, env = "SLK_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// List all users and exit
    #[arg(long = "ls-users", group = "mode")]
    ls_users: bool,

    /// List all channels and exit
    #[arg(long = "ls-channels", group = "mode")]
    ls_channels: bool,

    /// Write standard input to a channel line by line
    #[arg(long = "ch-cat", value_name = "CHANNEL", group = "mode")]
    ch_cat: Option<String>,

    /// Log file (default: ~/.slk.log)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_path);
    // Held until the session is over so buffered lines reach the file.
    let _log_guard = logging::init(&log_path)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let remote: Arc<dyn RemoteClient> = Arc::new(SlackClient::new(config.credentials()));

    if cli.ls_users {
        return commands::list::users(remote.as_ref()).await;
    }
    if cli.ls_channels {
        return commands::list::channels(remote.as_ref()).await;
    }
    if let Some(channel) = cli.ch_cat.as_deref() {
        return commands::cat::run(remote.as_ref(), channel).await;
    }

    info!("starting interactive session");
    commands::chat::run(remote).await
}
