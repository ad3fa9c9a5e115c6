use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use reqwest::header::COOKIE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use slk_core::directory::User;
use slk_core::remote::{
    ChannelPage, ChannelQuery, HistoryMessage, RemoteClient, RemoteError, RemoteEventStream,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::rtm;
use crate::types::{
    ConversationHistory, ConversationsList, MarkRequest, PostMessageRequest, ResponseMetadata,
    RtmConnect, UsersList,
};

const DEFAULT_BASE_URL: &str = "https://slack.com";
const USERS_PAGE_SIZE: u32 = 200;
const STREAM_CAPACITY: usize = 256;

/// Credentials for a Slack workspace.
#[derive(Clone)]
pub struct SlackCredentials {
    /// `xoxc-`/`xoxp-` token.
    pub token: String,
    /// Value of the `d` session cookie; empty if the token does not need one.
    pub cookie: String,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    credentials: SlackCredentials,
}

impl SlackClient {
    pub fn new(credentials: SlackCredentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(credentials: SlackCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Asks for a fresh RTM websocket URL.
    pub async fn rtm_connect(&self) -> Result<RtmConnect, RemoteError> {
        self.get("rtm.connect", &[]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let request = self.authorized(self.http.get(self.url(method))).query(params);
        self.send(method, request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let request = self.authorized(self.http.post(self.url(method))).json(body);
        self.send(method, request).await
    }

    fn url(&self, method: &str) -> String {
        format!("{}/api/{method}", self.base_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.bearer_auth(&self.credentials.token);
        if self.credentials.cookie.is_empty() {
            request
        } else {
            request.header(COOKIE, format!("d={}", self.credentials.cookie))
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        debug!(method, "slack request");
        let response = request
            .send()
            .await
            .map_err(|err| RemoteError::Transport(format!("{method}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Transport(format!("{method}: http status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(format!("{method}: {err}")))?;
        decode_envelope(method, payload)
    }
}

/// Checks the `ok` flag and decodes the rest of the payload.
fn decode_envelope<T: DeserializeOwned>(method: &str, payload: Value) -> Result<T, RemoteError> {
    if payload.get("ok").and_then(Value::as_bool) != Some(true) {
        let code = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        return Err(RemoteError::Api(code.to_string()));
    }
    serde_json::from_value(payload).map_err(|err| RemoteError::Decode(format!("{method}: {err}")))
}

#[async_trait]
impl RemoteClient for SlackClient {
    async fn connect(&self) -> Result<RemoteEventStream, RemoteError> {
        let first = self.rtm_connect().await?;
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        tokio::spawn(rtm::run(self.clone(), first, tx));

        let events = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(events.boxed())
    }

    async fn get_channels(&self, query: ChannelQuery) -> Result<ChannelPage, RemoteError> {
        let types = query
            .types
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![
            ("limit", query.page_size.to_string()),
            ("types", types),
            ("exclude_archived", query.exclude_archived.to_string()),
        ];
        if let Some(cursor) = query.cursor {
            params.push(("cursor", cursor));
        }

        let list: ConversationsList = self.get("conversations.list", &params).await?;
        Ok(ChannelPage {
            channels: list.channels.into_iter().map(Into::into).collect(),
            next_cursor: ResponseMetadata::cursor(list.response_metadata),
        })
    }

    async fn get_users(&self) -> Result<Vec<User>, RemoteError> {
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params = vec![("limit", USERS_PAGE_SIZE.to_string())];
            if let Some(cursor) = cursor.take() {
                params.push(("cursor", cursor));
            }
            let page: UsersList = self.get("users.list", &params).await?;
            users.extend(page.members.into_iter().map(User::from));
            match ResponseMetadata::cursor(page.response_metadata) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(users)
    }

    async fn get_history(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, RemoteError> {
        let params = [("channel", channel.to_string()), ("limit", limit.to_string())];
        let history: ConversationHistory = self.get("conversations.history", &params).await?;
        // Slack returns newest first.
        Ok(history
            .messages
            .into_iter()
            .rev()
            .map(HistoryMessage::from)
            .collect())
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), RemoteError> {
        let body = PostMessageRequest {
            channel,
            text,
            as_user: true,
        };
        let _: Value = self.post("chat.postMessage", &body).await?;
        Ok(())
    }

    async fn mark_read(&self, channel: &str, ts: &str) -> Result<(), RemoteError> {
        let body = MarkRequest { channel, ts };
        let _: Value = self.post("conversations.mark", &body).await?;
        Ok(())
    }
}
