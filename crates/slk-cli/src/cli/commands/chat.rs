//! Interactive session.

use std::sync::Arc;

use anyhow::{Context, Result};
use slk_core::{RemoteClient, Session};
use slk_tui::TuiScreen;
use tracing::info;

pub async fn run(remote: Arc<dyn RemoteClient>) -> Result<()> {
    let mut session = Session::new(remote);
    let mut screen = TuiScreen::new()?;

    let outcome = session.run(&mut screen).await;
    // Restore the terminal before anything is printed.
    drop(screen);

    let shutdown = outcome.context("interactive session failed")?;
    info!(?shutdown, "session ended");
    Ok(())
}
