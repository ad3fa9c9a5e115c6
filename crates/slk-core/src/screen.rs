//! Terminal collaborator seen from the session.

use anyhow::Result;

use crate::bus::EventPoster;
use crate::state::SessionState;

/// Size of the drawable area in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An initialized terminal the session can read input from and paint to.
///
/// Construction is the init step and dropping the value releases the
/// terminal.
pub trait Screen {
    /// Starts forwarding terminal input to `poster`. Called once, before the
    /// first paint.
    fn start_input(&mut self, poster: EventPoster) -> Result<()>;

    fn viewport(&self) -> Result<Viewport>;

    /// Repaints the whole screen from `state`.
    fn paint(&mut self, state: &SessionState) -> Result<()>;
}
