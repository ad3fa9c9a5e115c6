//! Credentials file.
//!
//! `~/.slk.json` holds the workspace token and session cookie:
//!
//! ```json
//! { "api_token": "xoxc-...", "cookie": "..." }
//! ```
//!
//! The file carries secrets, so on unix it must be readable by its owner only.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use slk_slack::SlackCredentials;

pub const CONFIG_FILE_NAME: &str = ".slk.json";
#[cfg(unix)]
const EXPECTED_MODE: u32 = 0o600;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_token: String,
    #[serde(default)]
    pub cookie: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).context("stat error")?;
        check_permissions(&metadata)?;

        let contents = fs::read_to_string(path).context("read error")?;
        serde_json::from_str(&contents).context("parse error")
    }

    pub fn credentials(&self) -> SlackCredentials {
        SlackCredentials {
            token: self.api_token.clone(),
            cookie: self.cookie.clone(),
        }
    }
}

/// `~/.slk.json`, or a relative `.slk.json` when there is no home directory.
pub fn default_path() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(CONFIG_FILE_NAME),
        |home| home.join(CONFIG_FILE_NAME),
    )
}

#[cfg(unix)]
fn check_permissions(metadata: &fs::Metadata) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o777;
    if mode != EXPECTED_MODE {
        anyhow::bail!("permission error: expected 0{EXPECTED_MODE:o} but found 0{mode:o}");
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_metadata: &fs::Metadata) -> Result<()> {
    Ok(())
}
