//! Event handlers.
//!
//! Each handler is a plain function over [`SessionState`]. Handlers never do
//! I/O; they return [`Effect`]s for the session loop to run.

use chrono::Local;
use tracing::{debug, info, warn};

use crate::command::{self, Command, CommandError};
use crate::directory::{UNKNOWN_USER, UserDirectory};
use crate::effects::Effect;
use crate::event::{CustomEvent, Event, RemoteEvent, TaskResult, TerminalEvent};
use crate::history::Message;
use crate::remote::{HistoryMessage, parse_ts};
use crate::state::{ChannelState, SessionState};

/// A handler got an event shape it was not registered for.
fn contract_violation(handler: &str, event: &Event) -> ! {
    panic!("{handler} received unexpected event {event:?}")
}

pub fn on_debug(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let text = match event {
        Event::Debug(text) => text,
        other => contract_violation("on_debug", &other),
    };
    state.history.add_message(Message::debug(text));
    vec![]
}

/// Submits the compose line.
pub fn on_enter(state: &mut SessionState, _event: Event) -> Vec<Effect> {
    let line = state.input.submit();
    if line.trim().is_empty() {
        return vec![];
    }

    match command::parse(&line) {
        Ok(Some(command)) => run_command(state, command),
        Ok(None) => match state.active_channel() {
            Some(channel) => vec![Effect::PostMessage {
                channel: channel.to_string(),
                text: line,
            }],
            None => vec![Effect::diagnostic(CommandError::NoActiveChannel.to_string())],
        },
        Err(err) => vec![Effect::diagnostic(err.to_string())],
    }
}

fn run_command(state: &mut SessionState, command: Command) -> Vec<Effect> {
    match command {
        Command::Join(name) => join_channel(state, &name),
        Command::Clear => {
            state.history.clear();
            vec![]
        }
        Command::Refresh => vec![Effect::RefreshDirectory],
        Command::Quit => vec![Effect::Shutdown],
    }
}

/// Starts a switch to the channel displayed as `name`.
///
/// The active channel is assigned immediately; the history fetch result is
/// applied whenever it completes.
pub fn join_channel(state: &mut SessionState, name: &str) -> Vec<Effect> {
    let Some(key) = state
        .channels
        .find_by_display_name(name)
        .map(|channel| channel.key.clone())
    else {
        return vec![Effect::diagnostic(
            CommandError::ChannelNotFound(name.to_string()).to_string(),
        )];
    };

    let request = state.request_seq.next_id();
    info!(channel = %key, name, request = request.0, "switching channel");
    state.unread.remove(&key);
    state.channel = ChannelState::Switching {
        target: key.clone(),
    };
    vec![Effect::FetchHistory {
        request,
        channel: key,
    }]
}

pub fn on_backspace(state: &mut SessionState, _event: Event) -> Vec<Effect> {
    state.input.backspace();
    vec![]
}

pub fn on_space(state: &mut SessionState, _event: Event) -> Vec<Effect> {
    state.input.append_char(' ');
    vec![]
}

pub fn append_char(state: &mut SessionState, c: char) -> Vec<Effect> {
    state.input.append_char(c);
    vec![]
}

pub fn on_resize(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let (width, height) = match event {
        Event::Terminal(TerminalEvent::Resize { width, height }) => (width, height),
        other => contract_violation("on_resize", &other),
    };
    state.viewport.width = width;
    state.viewport.height = height;
    vec![]
}

pub fn on_shutdown(_state: &mut SessionState, _event: Event) -> Vec<Effect> {
    vec![Effect::Shutdown]
}

pub fn on_connected(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let self_id = match event {
        Event::Remote(RemoteEvent::Connected { self_id }) => self_id,
        other => contract_violation("on_connected", &other),
    };
    info!(self_id = %self_id, "connected");
    let text = format!("connected as {self_id}");
    state.self_id = Some(self_id);
    vec![Effect::diagnostic(text)]
}

pub fn on_message(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let message = match event {
        Event::Remote(RemoteEvent::Message(message)) => message,
        other => contract_violation("on_message", &other),
    };

    if state.active_channel() != Some(message.channel.as_str()) {
        debug!(
            channel = %state.channels.display_name(&message.channel),
            "message for inactive channel"
        );
        *state.unread.entry(message.channel).or_default() += 1;
        return vec![];
    }

    let timestamp = parse_ts(&message.ts).unwrap_or_else(Local::now);
    let sender = state.users.display_name(&message.user).to_string();
    state
        .history
        .add_message(Message::new(timestamp, sender, message.text));
    vec![]
}

pub fn on_connection_error(_state: &mut SessionState, event: Event) -> Vec<Effect> {
    let text = match event {
        Event::Remote(RemoteEvent::Error(error)) => format!("connection error: {error}"),
        Event::Remote(RemoteEvent::Disconnected { reason }) => format!("disconnected: {reason}"),
        other => contract_violation("on_connection_error", &other),
    };
    warn!("{text}");
    vec![Effect::diagnostic(text)]
}

pub fn on_channels_loaded(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let channels = match event {
        Event::Custom(CustomEvent {
            payload: TaskResult::ChannelsLoaded(channels),
            ..
        }) => channels,
        other => contract_violation("on_channels_loaded", &other),
    };
    state.channels.replace(channels);
    vec![]
}

pub fn on_users_loaded(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let users = match event {
        Event::Custom(CustomEvent {
            payload: TaskResult::UsersLoaded(users),
            ..
        }) => users,
        other => contract_violation("on_users_loaded", &other),
    };
    state.users.replace(users);
    vec![]
}

/// Applies a completed history fetch.
///
/// The most recently completed fetch wins, even if the user switched away in
/// the meantime.
pub fn on_history_loaded(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let (request, channel, messages) = match event {
        Event::Custom(CustomEvent {
            payload:
                TaskResult::HistoryLoaded {
                    request,
                    channel,
                    messages,
                },
            ..
        }) => (request, channel, messages),
        other => contract_violation("on_history_loaded", &other),
    };

    if state.active_channel() != Some(channel.as_str()) {
        warn!(
            channel = %channel,
            request = request.0,
            "applying history for a superseded switch"
        );
    }

    let newest = messages.last().map(|message| message.ts.clone());
    let converted = messages
        .into_iter()
        .filter_map(|message| history_entry(&state.users, message))
        .collect();
    state.history.replace(converted);
    finish_switch(state, &channel);
    state.unread.remove(&channel);

    newest
        .map(|ts| vec![Effect::MarkRead { channel, ts }])
        .unwrap_or_default()
}

fn history_entry(users: &UserDirectory, message: HistoryMessage) -> Option<Message> {
    let Some(timestamp) = message.timestamp() else {
        warn!(ts = %message.ts, "skipping message with unparsable timestamp");
        return None;
    };
    let sender = match (&message.username, &message.user) {
        (Some(name), _) if !name.is_empty() => name.clone(),
        (_, Some(user)) => users.display_name(user).to_string(),
        _ => UNKNOWN_USER.to_string(),
    };
    Some(Message::new(timestamp, sender, message.text))
}

pub fn on_history_failed(state: &mut SessionState, event: Event) -> Vec<Effect> {
    let (request, channel, error) = match event {
        Event::Custom(CustomEvent {
            payload:
                TaskResult::HistoryFailed {
                    request,
                    channel,
                    error,
                },
            ..
        }) => (request, channel, error),
        other => contract_violation("on_history_failed", &other),
    };

    warn!(channel = %channel, request = request.0, error = %error, "history fetch failed");
    finish_switch(state, &channel);
    vec![Effect::diagnostic(format!(
        "could not load history for {}: {error}",
        state.channels.display_name(&channel)
    ))]
}

fn finish_switch(state: &mut SessionState, channel: &str) {
    if let ChannelState::Switching { target } = &state.channel
        && target == channel
    {
        state.channel = ChannelState::Active {
            key: channel.to_string(),
        };
    }
}
