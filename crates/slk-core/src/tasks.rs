//! Background work started by effects.
//!
//! Each function talks to the remote and reports back only through events.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::bus::EventPoster;
use crate::event::Event;
use crate::remote::{self, HISTORY_LIMIT, RemoteClient};
use crate::task::TaskId;

pub async fn fetch_history(
    remote: Arc<dyn RemoteClient>,
    request: TaskId,
    channel: String,
) -> Event {
    match remote.get_history(&channel, HISTORY_LIMIT).await {
        Ok(messages) => {
            info!(
                channel = %channel,
                request = request.0,
                count = messages.len(),
                "history loaded"
            );
            Event::history_loaded(request, channel, messages)
        }
        Err(err) => Event::history_failed(request, channel, err.to_string()),
    }
}

/// Posts `event`. `false` once the bus is closed.
pub async fn deliver(poster: &EventPoster, event: Event) -> bool {
    if poster.post(event).await.is_err() {
        debug!("result dropped, event bus closed");
        return false;
    }
    true
}

/// Reloads channels, then users. Stops at the first failure or once the bus
/// is closed.
pub async fn refresh_directory(remote: Arc<dyn RemoteClient>, poster: EventPoster) {
    let channels = match remote::load_channels(remote.as_ref()).await {
        Ok(channels) => channels,
        Err(err) => {
            warn!(error = %err, "channel refresh failed");
            deliver(&poster, Event::debug(format!("could not load channels: {err}"))).await;
            return;
        }
    };
    let loaded = Event::debug(format!("Loaded {} channels", channels.len()));
    if !deliver(&poster, loaded).await
        || !deliver(&poster, Event::channels_loaded(channels)).await
    {
        return;
    }

    let users = match remote::load_users(remote.as_ref()).await {
        Ok(users) => users,
        Err(err) => {
            warn!(error = %err, "user refresh failed");
            deliver(&poster, Event::debug(format!("could not load users: {err}"))).await;
            return;
        }
    };
    let loaded = Event::debug(format!("Loaded {} users", users.len()));
    if deliver(&poster, loaded).await {
        deliver(&poster, Event::users_loaded(users)).await;
    }
}

/// Returns a diagnostic only on failure.
pub async fn post_message(
    remote: Arc<dyn RemoteClient>,
    channel: String,
    text: String,
) -> Option<Event> {
    match remote.post_message(&channel, &text).await {
        Ok(()) => None,
        Err(err) => {
            warn!(channel = %channel, error = %err, "post failed");
            Some(Event::debug(format!("could not send message: {err}")))
        }
    }
}

pub async fn mark_read(
    remote: Arc<dyn RemoteClient>,
    channel: String,
    ts: String,
) -> Option<Event> {
    match remote.mark_read(&channel, &ts).await {
        Ok(()) => None,
        Err(err) => {
            warn!(channel = %channel, error = %err, "mark read failed");
            Some(Event::debug(format!("could not mark channel read: {err}")))
        }
    }
}

/// Connects and forwards the remote stream onto the bus until either side
/// ends.
pub async fn forward_remote(remote: Arc<dyn RemoteClient>, poster: EventPoster) {
    let mut stream = match remote.connect().await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(error = %err, "connect failed");
            deliver(&poster, Event::debug(format!("could not connect: {err}"))).await;
            return;
        }
    };

    while let Some(event) = stream.next().await {
        if !deliver(&poster, Event::Remote(event)).await {
            break;
        }
    }
    info!("remote stream ended");
}
