//! `--ch-cat`: post standard input to a channel line by line.
//!
//! Our own messages cannot be marked unread, so the newest message from
//! someone else is marked read instead. New lines from stdin then show up as
//! unread for everyone else, including our other clients.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use slk_core::RemoteClient;
use slk_core::directory::ChannelDirectory;
use slk_core::event::RemoteEvent;
use slk_core::remote::{self, HISTORY_LIMIT, HistoryMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(remote: &dyn RemoteClient, channel: &str) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    cat(remote, channel, stdin).await
}

async fn cat<R>(remote: &dyn RemoteClient, channel: &str, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let channel = resolve_channel(remote, channel).await?;
    let self_id = wait_for_self_id(remote).await?;

    let history = remote
        .get_history(&channel, HISTORY_LIMIT)
        .await
        .context("could not get chat history")?;
    if let Some(ts) = latest_foreign_ts(&history, &self_id) {
        remote
            .mark_read(&channel, ts)
            .await
            .context("could not mark channel read")?;
    }

    let mut lines = input.lines();
    let mut posted = 0usize;
    while let Some(line) = lines.next_line().await.context("reading from stdin failed")? {
        remote
            .post_message(&channel, &line)
            .await
            .context("could not post message")?;
        posted += 1;
    }
    info!(channel = %channel, posted, "stdin drained");
    Ok(())
}

/// Accepts a channel key or a `#name`.
async fn resolve_channel(remote: &dyn RemoteClient, channel: &str) -> Result<String> {
    if !channel.starts_with('#') {
        return Ok(channel.to_string());
    }
    let mut directory = ChannelDirectory::new();
    directory.replace(
        remote::load_channels(remote)
            .await
            .context("loading channels failed")?,
    );
    directory
        .find_by_display_name(channel)
        .map(|found| found.key.clone())
        .with_context(|| format!("channel not found: {channel}"))
}

async fn wait_for_self_id(remote: &dyn RemoteClient) -> Result<String> {
    let mut stream = remote.connect().await.context("could not connect")?;
    let connected = async {
        while let Some(event) = stream.next().await {
            match event {
                RemoteEvent::Connected { self_id } => return Some(self_id),
                other => debug!(event = ?other, "waiting for connection"),
            }
        }
        None
    };
    match tokio::time::timeout(CONNECT_TIMEOUT, connected).await {
        Ok(Some(self_id)) => Ok(self_id),
        Ok(None) => bail!("connection closed before it was established"),
        Err(_) => bail!("timed out waiting for connection"),
    }
}

/// Timestamp of the newest message with text that was not sent by `self_id`.
fn latest_foreign_ts<'a>(history: &'a [HistoryMessage], self_id: &str) -> Option<&'a str> {
    history
        .iter()
        .rev()
        .find(|message| message.user.as_deref() != Some(self_id) && !message.text.is_empty())
        .map(|message| message.ts.as_str())
}
