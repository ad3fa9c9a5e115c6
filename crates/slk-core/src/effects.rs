//! Session effects.
//!
//! Handlers only mutate state and return effects; the session loop executes
//! them. Anything that does I/O is an effect.

use crate::event::Event;
use crate::task::TaskId;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Queue an event for the consumer loop (processed before the next bus
    /// event).
    Emit(Event),

    /// Fetch the latest history of `channel` in the background.
    FetchHistory { request: TaskId, channel: String },

    /// Reload the channel and user directories in the background.
    RefreshDirectory,

    /// Send `text` to `channel`.
    PostMessage { channel: String, text: String },

    /// Move the read marker of `channel` to `ts`.
    MarkRead { channel: String, ts: String },

    /// Stop the session loop.
    Shutdown,
}

impl Effect {
    /// A diagnostic shown in the chat pane.
    pub fn diagnostic(text: impl Into<String>) -> Self {
        Effect::Emit(Event::debug(text))
    }
}
