use serde::{Deserialize, Serialize};
use slk_core::directory::{Channel, ChannelKind, User, Visibility};
use slk_core::remote::HistoryMessage;

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    pub fn cursor(metadata: Option<ResponseMetadata>) -> Option<String> {
        metadata
            .map(|metadata| metadata.next_cursor)
            .filter(|cursor| !cursor.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversationsList {
    #[serde(default)]
    pub channels: Vec<Conversation>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Peer of a direct message.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    #[serde(default)]
    pub num_members: Option<u32>,
}

impl From<Conversation> for Channel {
    fn from(conversation: Conversation) -> Self {
        let kind = if conversation.is_im {
            ChannelKind::DirectMessage
        } else if conversation.is_mpim {
            ChannelKind::MultiPartyDirectMessage
        } else if conversation.is_private {
            ChannelKind::PrivateChannel
        } else {
            ChannelKind::PublicChannel
        };
        let visibility = if kind == ChannelKind::PublicChannel {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let name = conversation
            .name
            .or(conversation.user)
            .unwrap_or_else(|| conversation.id.clone());

        Channel {
            key: conversation.id,
            name,
            is_member: conversation.is_member || conversation.is_im,
            visibility,
            member_count: conversation.num_members.unwrap_or(0),
            kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsersList {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<Member> for User {
    fn from(member: Member) -> Self {
        let real_name = member
            .real_name
            .filter(|name| !name.is_empty())
            .or(member.profile.real_name)
            .unwrap_or_default();
        User {
            id: member.id,
            name: member.name,
            real_name,
            email: member.profile.email.unwrap_or_default(),
            title: member.profile.title.unwrap_or_default(),
            deleted: member.deleted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConversationHistory {
    #[serde(default)]
    pub messages: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl From<HistoryEntry> for HistoryMessage {
    fn from(entry: HistoryEntry) -> Self {
        HistoryMessage {
            ts: entry.ts,
            user: entry.user,
            username: entry.username,
            text: entry.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RtmConnect {
    pub url: String,
    #[serde(rename = "self")]
    pub identity: RtmSelf,
}

#[derive(Debug, Deserialize)]
pub struct RtmSelf {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    pub as_user: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkRequest<'a> {
    pub channel: &'a str,
    pub ts: &'a str,
}
