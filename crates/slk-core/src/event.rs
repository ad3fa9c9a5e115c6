//! Event types.
//!
//! All inputs to the session (terminal, remote stream, diagnostics, background
//! task results) are converted to [`Event`] before being dispatched.
//! Producers build these values and post them onto the bus; they never touch
//! session state.

use std::collections::HashMap;

use crate::directory::{Channel, User};
use crate::identity::keys;
use crate::remote::HistoryMessage;
use crate::task::TaskId;

/// Unified event enum for the session.
#[derive(Debug, Clone)]
pub enum Event {
    /// Event from the remote messaging stream.
    Remote(RemoteEvent),
    /// Terminal input (key press, resize).
    Terminal(TerminalEvent),
    /// Human-readable status or error text to show in the chat pane.
    Debug(String),
    /// Ad hoc event carrying its own dispatch key.
    Custom(CustomEvent),
}

impl Event {
    /// Creates a diagnostic event.
    pub fn debug(text: impl Into<String>) -> Self {
        Event::Debug(text.into())
    }

    /// Creates a custom event with an explicit dispatch key.
    pub fn custom(key: impl Into<String>, payload: TaskResult) -> Self {
        Event::Custom(CustomEvent {
            key: key.into(),
            payload,
        })
    }

    /// Channel directory refresh finished.
    pub fn channels_loaded(channels: HashMap<String, Channel>) -> Self {
        Self::custom(keys::CHANNELS_LOADED, TaskResult::ChannelsLoaded(channels))
    }

    /// User directory refresh finished.
    pub fn users_loaded(users: HashMap<String, User>) -> Self {
        Self::custom(keys::USERS_LOADED, TaskResult::UsersLoaded(users))
    }

    /// History fetch for `channel` succeeded.
    pub fn history_loaded(request: TaskId, channel: String, messages: Vec<HistoryMessage>) -> Self {
        Self::custom(
            keys::HISTORY_LOADED,
            TaskResult::HistoryLoaded {
                request,
                channel,
                messages,
            },
        )
    }

    /// History fetch for `channel` failed.
    pub fn history_failed(request: TaskId, channel: String, error: String) -> Self {
        Self::custom(
            keys::HISTORY_FAILED,
            TaskResult::HistoryFailed {
                request,
                channel,
                error,
            },
        )
    }
}

/// Events delivered by the remote messaging collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// A connection attempt is starting.
    Connecting { attempt: u32 },
    /// Connection established; carries our own user id.
    Connected { self_id: String },
    /// Server greeting after the stream opened.
    Hello,
    /// A chat message was posted somewhere we can see.
    Message(IncomingMessage),
    /// A user's presence changed.
    PresenceChange { user: String, presence: String },
    /// Round-trip time measured by the keepalive ping.
    LatencyReport { rtt_ms: u64 },
    /// The stream closed; the collaborator will reconnect.
    Disconnected { reason: String },
    /// Connection-level error.
    Error(String),
    /// Any other wire event type.
    Other { kind: String },
}

/// A message received on the remote stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel: String,
    pub user: String,
    pub text: String,
    /// Remote timestamp string (seconds with fractional part).
    pub ts: String,
}

/// Terminal input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(Key),
    Resize { width: u16, height: u16 },
    /// Input we do not model (mouse, focus, paste).
    Other,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Plain character.
    Char(char),
    /// Character with Ctrl held.
    Ctrl(char),
    /// Character with Alt held.
    Alt(char),
    Named(NamedKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Enter,
    Backspace,
    Space,
    Escape,
    Tab,
    BackTab,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// Custom event: a payload plus the dispatch key chosen by its producer.
#[derive(Debug, Clone)]
pub struct CustomEvent {
    pub key: String,
    pub payload: TaskResult,
}

/// Results of background tasks.
#[derive(Debug, Clone)]
pub enum TaskResult {
    ChannelsLoaded(HashMap<String, Channel>),
    UsersLoaded(HashMap<String, User>),
    HistoryLoaded {
        request: TaskId,
        channel: String,
        messages: Vec<HistoryMessage>,
    },
    HistoryFailed {
        request: TaskId,
        channel: String,
        error: String,
    },
}
