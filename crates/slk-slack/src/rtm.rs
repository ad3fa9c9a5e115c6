//! RTM websocket connection.
//!
//! One task per session owns the socket, decodes frames into
//! [`RemoteEvent`]s and reconnects with capped exponential backoff. The task
//! ends when the event receiver is dropped.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use slk_core::event::{IncomingMessage, RemoteEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::client::SlackClient;
use crate::types::RtmConnect;

const PING_INTERVAL: Duration = Duration::from_secs(30);
/// Pings without a pong after this long are forgotten.
const PONG_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before reconnect attempt `failures` (1-based).
pub fn backoff_delay(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(5);
    Duration::from_secs(1u64 << exponent).min(MAX_BACKOFF)
}

/// A decoded RTM frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Event(RemoteEvent),
    /// Reply to one of our pings.
    Pong { reply_to: u64 },
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    presence: Option<String>,
    #[serde(default)]
    reply_to: Option<u64>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    msg: String,
}

/// Decodes one text frame. Frames without a `type` (acks for sent
/// messages) yield `None`.
pub fn parse_frame(text: &str) -> Option<Frame> {
    let mut raw: RawFrame = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "undecodable rtm frame");
            return None;
        }
    };
    let kind = raw.kind.take()?;

    let event = match kind.as_str() {
        "pong" => return raw.reply_to.map(|reply_to| Frame::Pong { reply_to }),
        "hello" => RemoteEvent::Hello,
        "message" if is_notification(&raw) => RemoteEvent::Other {
            kind: raw.subtype.unwrap_or_else(|| "message_hidden".to_string()),
        },
        "message" => RemoteEvent::Message(IncomingMessage {
            channel: raw.channel.unwrap_or_default(),
            user: raw.user.or(raw.bot_id).unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            ts: raw.ts.unwrap_or_default(),
        }),
        "presence_change" => RemoteEvent::PresenceChange {
            user: raw.user.unwrap_or_default(),
            presence: raw.presence.unwrap_or_default(),
        },
        "error" => RemoteEvent::Error(raw.error.map(|error| error.msg).unwrap_or_default()),
        _ => RemoteEvent::Other { kind },
    };
    Some(Frame::Event(event))
}

/// Edits, deletions and hidden updates carry no new chat line.
fn is_notification(raw: &RawFrame) -> bool {
    raw.hidden
        || matches!(
            raw.subtype.as_deref(),
            Some("message_changed" | "message_deleted" | "message_replied")
        )
}

/// Tracks outstanding pings for latency reports.
#[derive(Debug, Default)]
struct Pinger {
    next_id: u64,
    sent: HashMap<u64, Instant>,
}

impl Pinger {
    fn ping(&mut self) -> String {
        let now = Instant::now();
        self.sent.retain(|_, sent| now.duration_since(*sent) < PONG_TIMEOUT);
        self.next_id += 1;
        self.sent.insert(self.next_id, now);
        json!({ "id": self.next_id, "type": "ping" }).to_string()
    }

    fn pong(&mut self, reply_to: u64) -> Option<Duration> {
        self.sent.remove(&reply_to).map(|sent| sent.elapsed())
    }
}

/// Connection loop. `first` is the result of the `rtm.connect` call made by
/// `connect()`; later attempts request a new URL.
pub async fn run(client: SlackClient, first: RtmConnect, tx: mpsc::Sender<RemoteEvent>) {
    let mut pending = Some(first);
    let mut failures = 0u32;

    loop {
        let attempt = failures + 1;
        if tx.send(RemoteEvent::Connecting { attempt }).await.is_err() {
            return;
        }

        let connect = match pending.take() {
            Some(connect) => Ok(connect),
            None => client.rtm_connect().await,
        };
        let lost = match connect {
            Ok(connect) => match session(&connect, &tx).await {
                Ok(SessionEnd::ReceiverGone) => return,
                Ok(SessionEnd::Closed(reason)) => {
                    failures = 0;
                    warn!(reason = %reason, "rtm connection closed");
                    RemoteEvent::Disconnected { reason }
                }
                Err(reason) => {
                    warn!(attempt, reason = %reason, "rtm connection failed");
                    RemoteEvent::Error(reason)
                }
            },
            Err(err) => {
                warn!(attempt, error = %err, "rtm.connect failed");
                RemoteEvent::Error(err.to_string())
            }
        };

        failures += 1;
        if tx.send(lost).await.is_err() {
            return;
        }

        let delay = backoff_delay(failures);
        debug!(?delay, "rtm reconnect scheduled");
        tokio::time::sleep(delay).await;
    }
}

enum SessionEnd {
    Closed(String),
    ReceiverGone,
}

/// Runs one websocket session. `Err` means it never became usable.
async fn session(
    connect: &RtmConnect,
    tx: &mpsc::Sender<RemoteEvent>,
) -> Result<SessionEnd, String> {
    let (mut ws, _response) = connect_async(connect.url.as_str())
        .await
        .map_err(|err| format!("websocket connect failed: {err}"))?;

    info!(self_id = %connect.identity.id, "rtm connected");
    let connected = RemoteEvent::Connected {
        self_id: connect.identity.id.clone(),
    };
    if tx.send(connected).await.is_err() {
        let _ = ws.close(None).await;
        return Ok(SessionEnd::ReceiverGone);
    }

    let mut pinger = Pinger::default();
    let mut ticker = tokio::time::interval(PING_INTERVAL);
    ticker.tick().await;

    let end = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = ws.send(Message::Text(pinger.ping().into())).await {
                    break SessionEnd::Closed(format!("ping failed: {err}"));
                }
            }
            frame = ws.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => match parse_frame(text.as_str()) {
                        Some(Frame::Event(event)) => Some(event),
                        Some(Frame::Pong { reply_to }) => pinger
                            .pong(reply_to)
                            .map(|rtt| RemoteEvent::LatencyReport {
                                rtt_ms: rtt.as_millis() as u64,
                            }),
                        None => None,
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|frame| frame.reason.to_string())
                            .filter(|reason| !reason.is_empty())
                            .unwrap_or_else(|| "closed by server".to_string());
                        break SessionEnd::Closed(reason);
                    }
                    Some(Ok(_)) => None,
                    Some(Err(err)) => break SessionEnd::Closed(err.to_string()),
                    None => break SessionEnd::Closed("stream ended".to_string()),
                };
                if let Some(event) = event
                    && tx.send(event).await.is_err()
                {
                    break SessionEnd::ReceiverGone;
                }
            }
        }
    };

    let _ = ws.close(None).await;
    Ok(end)
}
