//! Event identity: the dispatch key of an event.
//!
//! An identity has the form `<source>:<subtype>` and is a pure projection over
//! the [`Event`] variant. Custom events use the key embedded by their
//! producer verbatim, so new ad hoc kinds need no changes here.

use std::fmt;

use crate::event::{Event, Key, NamedKey, RemoteEvent, TerminalEvent};

pub const TERMINAL: &str = "terminal";
pub const REMOTE: &str = "remote";
pub const DEBUG: &str = "debug";

/// Dispatch keys used by the session's own producers.
pub mod keys {
    pub const CHANNELS_LOADED: &str = "slk:channels_loaded";
    pub const USERS_LOADED: &str = "slk:users_loaded";
    pub const HISTORY_LOADED: &str = "slk:history_loaded";
    pub const HISTORY_FAILED: &str = "slk:history_failed";
}

/// Deterministic `<source>:<subtype>` key for an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventIdentity(String);

impl EventIdentity {
    /// Computes the identity of `event`. Never fails.
    pub fn of(event: &Event) -> Self {
        let key = match event {
            Event::Terminal(terminal) => format!("{TERMINAL}:{}", terminal_subtype(terminal)),
            Event::Remote(remote) => format!("{REMOTE}:{}", remote_subtype(remote)),
            Event::Debug(_) => format!("{DEBUG}:"),
            Event::Custom(custom) => custom.key.clone(),
        };
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the first `:` (the whole key if there is none).
    pub fn source(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(source, _)| source)
    }

    /// Part after the first `:` (empty if there is none).
    pub fn subtype(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, subtype)| subtype)
    }

    /// Returns the character if this is a terminal identity whose subtype is
    /// exactly one printable character.
    pub fn printable_char(&self) -> Option<char> {
        if self.source() != TERMINAL {
            return None;
        }
        let mut chars = self.subtype().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Event {
    /// Shorthand for [`EventIdentity::of`].
    pub fn identity(&self) -> EventIdentity {
        EventIdentity::of(self)
    }
}

fn terminal_subtype(event: &TerminalEvent) -> String {
    match event {
        TerminalEvent::Key(Key::Char(' ')) => named_label(NamedKey::Space),
        TerminalEvent::Key(Key::Char(c)) => c.to_string(),
        TerminalEvent::Key(Key::Ctrl(c)) => format!("<C-{c}>"),
        TerminalEvent::Key(Key::Alt(c)) => format!("<M-{c}>"),
        TerminalEvent::Key(Key::Named(named)) => named_label(*named),
        TerminalEvent::Resize { .. } => "<Resize>".to_string(),
        TerminalEvent::Other => "<Other>".to_string(),
    }
}

fn named_label(key: NamedKey) -> String {
    let label = match key {
        NamedKey::Enter => "Enter",
        NamedKey::Backspace => "Backspace",
        NamedKey::Space => "Space",
        NamedKey::Escape => "Escape",
        NamedKey::Tab => "Tab",
        NamedKey::BackTab => "BackTab",
        NamedKey::Delete => "Delete",
        NamedKey::Insert => "Insert",
        NamedKey::Up => "Up",
        NamedKey::Down => "Down",
        NamedKey::Left => "Left",
        NamedKey::Right => "Right",
        NamedKey::Home => "Home",
        NamedKey::End => "End",
        NamedKey::PageUp => "PageUp",
        NamedKey::PageDown => "PageDown",
        NamedKey::F(n) => return format!("<F{n}>"),
    };
    format!("<{label}>")
}

fn remote_subtype(event: &RemoteEvent) -> &str {
    match event {
        RemoteEvent::Connecting { .. } => "connecting",
        RemoteEvent::Connected { .. } => "connected",
        RemoteEvent::Hello => "hello",
        RemoteEvent::Message(_) => "message",
        RemoteEvent::PresenceChange { .. } => "presence_change",
        RemoteEvent::LatencyReport { .. } => "latency_report",
        RemoteEvent::Disconnected { .. } => "disconnected",
        RemoteEvent::Error(_) => "error",
        RemoteEvent::Other { kind } => kind,
    }
}
