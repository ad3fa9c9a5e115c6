//! File logging. The terminal belongs to the UI, so logs never go to stderr.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "SLK_LOG";
const LOG_FILE_NAME: &str = ".slk.log";
const DEFAULT_FILTER: &str = "info";

/// `~/.slk.log`, or a relative `.slk.log` when there is no home directory.
pub fn default_path() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(LOG_FILE_NAME),
        |home| home.join(LOG_FILE_NAME),
    )
}

/// Installs the global subscriber, appending to `path`.
///
/// The filter comes from `SLK_LOG` and defaults to `info`. Buffered lines are
/// flushed when the returned guard is dropped.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_dropping_guard_flushes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slk.log");

        let guard = init(&path).unwrap();
        tracing::warn!("session stopping");
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("session stopping"), "log was: {contents:?}");
    }
}
