use std::io::Stdout;

use anyhow::{Context, Result};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use slk_core::{EventPoster, Screen, SessionState, Viewport};
use tracing::warn;

use crate::input::InputPoller;
use crate::render;
use crate::terminal;

/// Full-screen terminal UI. The terminal is restored when this is dropped.
pub struct TuiScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    poller: Option<InputPoller>,
}

impl TuiScreen {
    pub fn new() -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to initialize terminal")?;
        Ok(Self {
            terminal,
            poller: None,
        })
    }
}

impl Screen for TuiScreen {
    fn start_input(&mut self, poster: EventPoster) -> Result<()> {
        let poller = InputPoller::spawn(poster).context("Failed to spawn input thread")?;
        self.poller = Some(poller);
        Ok(())
    }

    fn viewport(&self) -> Result<Viewport> {
        let size = self.terminal.size().context("Failed to query terminal size")?;
        Ok(Viewport::new(size.width, size.height))
    }

    fn paint(&mut self, state: &SessionState) -> Result<()> {
        self.terminal
            .draw(|frame| render::render(state, frame))
            .context("Failed to draw frame")?;
        Ok(())
    }
}

impl Drop for TuiScreen {
    fn drop(&mut self) {
        // Stop input before leaving raw mode.
        drop(self.poller.take());
        if let Err(err) = terminal::restore_terminal() {
            warn!(error = %err, "failed to restore terminal");
        }
    }
}
