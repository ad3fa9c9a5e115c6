//! Session state.
//!
//! Owned by the consumer loop and mutated only by handlers.

use std::collections::HashMap;

use crate::directory::{ChannelDirectory, UserDirectory};
use crate::history::ChatHistory;
use crate::input::InputBuffer;
use crate::screen::Viewport;
use crate::task::TaskSeq;

/// Channel-switch workflow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel joined yet.
    #[default]
    Idle,
    /// `/join` accepted; the history fetch for `target` has not completed.
    Switching { target: String },
    Active { key: String },
}

impl ChannelState {
    /// The channel messages are posted to. Switching counts as active: the
    /// assignment is optimistic.
    pub fn active_key(&self) -> Option<&str> {
        match self {
            ChannelState::Idle => None,
            ChannelState::Switching { target } => Some(target),
            ChannelState::Active { key } => Some(key),
        }
    }

    pub fn is_switching(&self) -> bool {
        matches!(self, ChannelState::Switching { .. })
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub channel: ChannelState,
    pub channels: ChannelDirectory,
    pub users: UserDirectory,
    pub history: ChatHistory,
    pub input: InputBuffer,
    pub viewport: Viewport,
    /// Our own user id, once the remote reports it.
    pub self_id: Option<String>,
    /// Messages received for channels other than the active one.
    pub unread: HashMap<String, usize>,
    pub request_seq: TaskSeq,
}

impl SessionState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn active_channel(&self) -> Option<&str> {
        self.channel.active_key()
    }

    pub fn unread_count(&self, channel: &str) -> usize {
        self.unread.get(channel).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_key_is_optimistic() {
        assert_eq!(ChannelState::Idle.active_key(), None);
        let switching = ChannelState::Switching {
            target: "C1".to_string(),
        };
        assert_eq!(switching.active_key(), Some("C1"));
        assert!(switching.is_switching());
        assert_eq!(
            ChannelState::Active {
                key: "C2".to_string()
            }
            .active_key(),
            Some("C2")
        );
    }
}
