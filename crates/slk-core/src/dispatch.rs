//! Identity-keyed dispatch.
//!
//! Resolution order for an identity:
//! 1. exact entry in the handler table (an entry may be an explicit ignore)
//! 2. a terminal identity that is a single printable character appends it to
//!    the compose line
//! 3. anything else is reported as an unhandled event

use std::collections::HashMap;

use tracing::debug;

use crate::effects::Effect;
use crate::event::Event;
use crate::handlers;
use crate::identity::{EventIdentity, keys};
use crate::state::SessionState;

pub type Handler = fn(&mut SessionState, Event) -> Vec<Effect>;

/// How an identity resolved.
#[derive(Debug, Clone, Copy)]
pub enum Route {
    Handler(Handler),
    Ignore,
    AppendChar(char),
    Unhandled,
}

/// Immutable handler table, built once per session.
#[derive(Debug)]
pub struct Dispatcher {
    table: HashMap<&'static str, Option<Handler>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let entries: [(&'static str, Option<Handler>); 27] = [
            ("debug:", Some(handlers::on_debug)),
            ("terminal:<Enter>", Some(handlers::on_enter)),
            ("terminal:<Backspace>", Some(handlers::on_backspace)),
            ("terminal:<Space>", Some(handlers::on_space)),
            ("terminal:<Resize>", Some(handlers::on_resize)),
            ("terminal:<C-c>", Some(handlers::on_shutdown)),
            ("terminal:<Escape>", Some(handlers::on_shutdown)),
            ("remote:connected", Some(handlers::on_connected)),
            ("remote:message", Some(handlers::on_message)),
            ("remote:error", Some(handlers::on_connection_error)),
            ("remote:disconnected", Some(handlers::on_connection_error)),
            ("remote:connecting", None),
            ("remote:hello", None),
            ("remote:latency_report", None),
            ("remote:presence_change", None),
            ("remote:user_typing", None),
            ("remote:reconnect_url", None),
            ("remote:goodbye", None),
            ("remote:message_changed", None),
            ("remote:message_deleted", None),
            ("remote:message_replied", None),
            ("remote:message_hidden", None),
            (keys::CHANNELS_LOADED, Some(handlers::on_channels_loaded)),
            (keys::USERS_LOADED, Some(handlers::on_users_loaded)),
            (keys::HISTORY_LOADED, Some(handlers::on_history_loaded)),
            (keys::HISTORY_FAILED, Some(handlers::on_history_failed)),
            ("terminal:<Other>", None),
        ];
        Self {
            table: entries.into_iter().collect(),
        }
    }

    pub fn resolve(&self, identity: &EventIdentity) -> Route {
        match self.table.get(identity.as_str()) {
            Some(Some(handler)) => Route::Handler(*handler),
            Some(None) => Route::Ignore,
            None => match identity.printable_char() {
                Some(c) => Route::AppendChar(c),
                None => Route::Unhandled,
            },
        }
    }

    /// Routes `event` and runs its handler.
    pub fn dispatch(&self, state: &mut SessionState, event: Event) -> Vec<Effect> {
        let identity = event.identity();
        debug!(identity = %identity, "dispatch");
        match self.resolve(&identity) {
            Route::Handler(handler) => handler(state, event),
            Route::Ignore => vec![],
            Route::AppendChar(c) => handlers::append_char(state, c),
            Route::Unhandled => vec![Effect::diagnostic(format!("unhandled event {identity}"))],
        }
    }
}
