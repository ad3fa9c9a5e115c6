//! Remote messaging collaborator.
//!
//! The session only knows the [`RemoteClient`] trait: a connect call that
//! yields a stream of [`RemoteEvent`]s plus a handful of request/response
//! operations. Wire encoding and transport live in the implementing crate.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use futures_util::stream::BoxStream;

use crate::directory::{Channel, User};
use crate::event::RemoteEvent;

/// Page size used when listing channels.
pub const CHANNEL_PAGE_SIZE: u32 = 1000;

/// Number of messages requested on a channel switch.
pub const HISTORY_LIMIT: u32 = 100;

/// Errors reported by a [`RemoteClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network or protocol failure before a response was decoded.
    Transport(String),
    /// The remote answered with an error code.
    Api(String),
    /// The response could not be decoded.
    Decode(String),
    /// The connection is gone.
    Closed,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "transport error: {msg}"),
            RemoteError::Api(code) => write!(f, "api error: {code}"),
            RemoteError::Decode(msg) => write!(f, "decode error: {msg}"),
            RemoteError::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Conversation types accepted by [`RemoteClient::get_channels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationType {
    PublicChannel,
    PrivateChannel,
    Im,
    Mpim,
}

impl ConversationType {
    pub const ALL: [ConversationType; 4] = [
        ConversationType::PublicChannel,
        ConversationType::PrivateChannel,
        ConversationType::Im,
        ConversationType::Mpim,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConversationType::PublicChannel => "public_channel",
            ConversationType::PrivateChannel => "private_channel",
            ConversationType::Im => "im",
            ConversationType::Mpim => "mpim",
        }
    }
}

/// One `get_channels` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelQuery {
    pub cursor: Option<String>,
    pub page_size: u32,
    pub types: Vec<ConversationType>,
    pub exclude_archived: bool,
}

impl Default for ChannelQuery {
    fn default() -> Self {
        Self {
            cursor: None,
            page_size: CHANNEL_PAGE_SIZE,
            types: ConversationType::ALL.to_vec(),
            exclude_archived: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelPage {
    pub channels: Vec<Channel>,
    /// `None` once the listing is exhausted.
    pub next_cursor: Option<String>,
}

/// A message returned by a history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    /// Remote timestamp, seconds with a fractional part.
    pub ts: String,
    pub user: Option<String>,
    /// Sender name embedded in the payload (bots, integrations).
    pub username: Option<String>,
    pub text: String,
}

impl HistoryMessage {
    /// Local time for [`ts`](Self::ts), or `None` if it does not parse.
    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        parse_ts(&self.ts)
    }
}

/// Parses a remote timestamp (`"1700000000.000200"`) into local time.
pub fn parse_ts(ts: &str) -> Option<DateTime<Local>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    let secs: i64 = secs.parse().ok()?;
    let nanos = if frac.is_empty() {
        0
    } else {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(9).collect();
        digits.parse().ok()?
    };
    Local.timestamp_opt(secs, nanos).single()
}

pub type RemoteEventStream = BoxStream<'static, RemoteEvent>;

/// Operations the session needs from the remote messaging service.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Opens the real-time stream. The stream ends only when the client gives
    /// up; reconnects are reported as events on the stream.
    async fn connect(&self) -> Result<RemoteEventStream, RemoteError>;

    async fn get_channels(&self, query: ChannelQuery) -> Result<ChannelPage, RemoteError>;

    async fn get_users(&self) -> Result<Vec<User>, RemoteError>;

    /// Latest `limit` messages of `channel`, oldest first.
    async fn get_history(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, RemoteError>;

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), RemoteError>;

    async fn mark_read(&self, channel: &str, ts: &str) -> Result<(), RemoteError>;
}

/// Loads every channel, following cursors until the listing is exhausted.
pub async fn load_channels(
    remote: &dyn RemoteClient,
) -> Result<HashMap<String, Channel>, RemoteError> {
    let mut channels = HashMap::new();
    let mut query = ChannelQuery::default();
    loop {
        let page = remote.get_channels(query.clone()).await?;
        for channel in page.channels {
            channels.insert(channel.key.clone(), channel);
        }
        match page.next_cursor {
            Some(cursor) if !cursor.is_empty() => query.cursor = Some(cursor),
            _ => break,
        }
    }
    Ok(channels)
}

/// Loads every user that is not deleted.
pub async fn load_users(remote: &dyn RemoteClient) -> Result<HashMap<String, User>, RemoteError> {
    let users = remote.get_users().await?;
    Ok(users
        .into_iter()
        .filter(|user| !user.deleted)
        .map(|user| (user.id.clone(), user))
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use chrono::Timelike;
    use futures_util::stream;

    use super::*;
    use crate::directory::tests::channel;

    /// In-memory client. Records every request it receives.
    #[derive(Default)]
    pub(crate) struct FakeRemote {
        pub pages: Vec<ChannelPage>,
        pub users: Vec<User>,
        pub history: HashMap<String, Vec<HistoryMessage>>,
        pub stream: Mutex<Vec<RemoteEvent>>,
        pub queries: Mutex<Vec<ChannelQuery>>,
        pub posted: Mutex<Vec<(String, String)>>,
        pub marked: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl RemoteClient for FakeRemote {
        async fn connect(&self) -> Result<RemoteEventStream, RemoteError> {
            let events = std::mem::take(&mut *self.stream.lock().unwrap());
            Ok(Box::pin(stream::iter(events)))
        }

        async fn get_channels(&self, query: ChannelQuery) -> Result<ChannelPage, RemoteError> {
            let index = self.queries.lock().unwrap().len();
            self.queries.lock().unwrap().push(query);
            self.pages
                .get(index)
                .cloned()
                .ok_or_else(|| RemoteError::Api("no more pages".to_string()))
        }

        async fn get_users(&self) -> Result<Vec<User>, RemoteError> {
            Ok(self.users.clone())
        }

        async fn get_history(
            &self,
            channel: &str,
            _limit: u32,
        ) -> Result<Vec<HistoryMessage>, RemoteError> {
            self.history
                .get(channel)
                .cloned()
                .ok_or_else(|| RemoteError::Api("channel_not_found".to_string()))
        }

        async fn post_message(&self, channel: &str, text: &str) -> Result<(), RemoteError> {
            self.posted
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }

        async fn mark_read(&self, channel: &str, ts: &str) -> Result<(), RemoteError> {
            self.marked
                .lock()
                .unwrap()
                .push((channel.to_string(), ts.to_string()));
            Ok(())
        }
    }

    pub(crate) fn history_message(ts: &str, user: &str, text: &str) -> HistoryMessage {
        HistoryMessage {
            ts: ts.to_string(),
            user: Some(user.to_string()),
            username: None,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_channels_follows_cursor() {
        let remote = FakeRemote {
            pages: vec![
                ChannelPage {
                    channels: vec![channel("C1", "general", true)],
                    next_cursor: Some("page2".to_string()),
                },
                ChannelPage {
                    channels: vec![channel("C2", "random", false)],
                    next_cursor: Some(String::new()),
                },
            ],
            ..FakeRemote::default()
        };

        let channels = load_channels(&remote).await.unwrap();
        assert_eq!(channels.len(), 2);

        let queries = remote.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].cursor, None);
        assert_eq!(queries[0].page_size, CHANNEL_PAGE_SIZE);
        assert!(queries[0].exclude_archived);
        assert_eq!(queries[1].cursor.as_deref(), Some("page2"));
    }

    #[tokio::test]
    async fn test_load_channels_propagates_errors() {
        let remote = FakeRemote::default();
        let err = load_channels(&remote).await.unwrap_err();
        assert_eq!(err, RemoteError::Api("no more pages".to_string()));
    }

    #[tokio::test]
    async fn test_load_users_drops_deleted() {
        let remote = FakeRemote {
            users: vec![
                User {
                    id: "U1".to_string(),
                    name: "alice".to_string(),
                    ..User::default()
                },
                User {
                    id: "U2".to_string(),
                    name: "gone".to_string(),
                    deleted: true,
                    ..User::default()
                },
            ],
            ..FakeRemote::default()
        };

        let users = load_users(&remote).await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users.contains_key("U1"));
    }

    #[test]
    fn test_parse_ts() {
        let parsed = parse_ts("1700000000.000200").unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
        assert_eq!(parsed.nanosecond(), 200_000);
        assert!(parse_ts("1700000000").is_some());
        assert!(parse_ts("").is_none());
        assert!(parse_ts("abc.123").is_none());
        assert!(parse_ts("17.x").is_none());
    }

    #[test]
    fn test_remote_error_display() {
        assert_eq!(
            RemoteError::Api("not_in_channel".to_string()).to_string(),
            "api error: not_in_channel"
        );
        assert_eq!(RemoteError::Closed.to_string(), "connection closed");
    }
}
