//! Chat history for the active channel.

use chrono::{DateTime, Local};

/// Sender name used for diagnostic messages.
pub const DEBUG_SENDER: &str = "debug";

/// A chat line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    timestamp: DateTime<Local>,
    sender: String,
    text: String,
}

impl Message {
    pub fn new(
        timestamp: DateTime<Local>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Diagnostic message stamped with the current time.
    pub fn debug(text: impl Into<String>) -> Self {
        Self::new(Local::now(), DEBUG_SENDER, text)
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Single display row: `dd/mm HH:MM sender: text`.
    pub fn line(&self) -> String {
        format!(
            "{} {}: {}",
            self.timestamp.format("%d/%m %H:%M"),
            self.sender,
            self.text
        )
    }
}

/// Ordered message log. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the end.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Empties the backing sequence.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replaces the whole backing sequence in one step.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// The last `min(height, len)` messages, oldest first.
    pub fn render(&self, height: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(height);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
