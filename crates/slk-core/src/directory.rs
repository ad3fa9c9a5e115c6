//! Channel and user directories.
//!
//! Both caches are replaced wholesale when a refresh completes; entries are
//! never patched field by field.

use std::collections::HashMap;

/// Shown for a user id that is not in the directory.
pub const UNKNOWN_USER: &str = "unknown user";

/// Shown for a channel key that is not in the directory.
pub const UNKNOWN_CHANNEL: &str = "#unknown-channel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    PublicChannel,
    PrivateChannel,
    DirectMessage,
    MultiPartyDirectMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub key: String,
    pub name: String,
    pub is_member: bool,
    pub visibility: Visibility,
    pub member_count: u32,
    pub kind: ChannelKind,
}

impl Channel {
    /// `#name`, the form used by `/join`.
    pub fn display_name(&self) -> String {
        format!("#{}", self.name)
    }
}

/// Cache of channel metadata keyed by channel key.
#[derive(Debug, Clone, Default)]
pub struct ChannelDirectory {
    channels: HashMap<String, Channel>,
}

impl ChannelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry.
    pub fn replace(&mut self, channels: HashMap<String, Channel>) {
        self.channels = channels;
    }

    pub fn get(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    /// Finds the channel whose display name equals `display_name` exactly.
    ///
    /// If several match, the one with the smallest key wins.
    pub fn find_by_display_name(&self, display_name: &str) -> Option<&Channel> {
        self.channels
            .values()
            .filter(|channel| channel.display_name() == display_name)
            .min_by(|a, b| a.key.cmp(&b.key))
    }

    /// Display name for `key`, or [`UNKNOWN_CHANNEL`].
    pub fn display_name(&self, key: &str) -> String {
        self.get(key)
            .map_or_else(|| UNKNOWN_CHANNEL.to_string(), Channel::display_name)
    }

    /// Channels we are a member of, sorted by name.
    pub fn member_channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> =
            self.channels.values().filter(|c| c.is_member).collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        channels
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Handle.
    pub name: String,
    pub real_name: String,
    pub email: String,
    pub title: String,
    pub deleted: bool,
}

impl User {
    /// Real name if set, otherwise the handle.
    pub fn display_name(&self) -> &str {
        if self.real_name.is_empty() {
            &self.name
        } else {
            &self.real_name
        }
    }
}

/// Cache of users keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, users: HashMap<String, User>) {
        self.users = users;
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// Display name for `id`, or [`UNKNOWN_USER`].
    pub fn display_name(&self, id: &str) -> &str {
        self.get(id).map_or(UNKNOWN_USER, User::display_name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn channel(key: &str, name: &str, is_member: bool) -> Channel {
        Channel {
            key: key.to_string(),
            name: name.to_string(),
            is_member,
            visibility: Visibility::Public,
            member_count: 3,
            kind: ChannelKind::PublicChannel,
        }
    }

    pub(crate) fn directory(channels: &[Channel]) -> HashMap<String, Channel> {
        channels
            .iter()
            .map(|channel| (channel.key.clone(), channel.clone()))
            .collect()
    }

    #[test]
    fn test_find_by_display_name_is_exact() {
        let mut channels = ChannelDirectory::new();
        channels.replace(directory(&[
            channel("C1", "general", true),
            channel("C2", "general-chat", true),
        ]));

        assert_eq!(channels.find_by_display_name("#general").unwrap().key, "C1");
        assert!(channels.find_by_display_name("general").is_none());
        assert!(channels.find_by_display_name("#gen").is_none());
    }

    #[test]
    fn test_replace_drops_old_entries() {
        let mut channels = ChannelDirectory::new();
        channels.replace(directory(&[channel("C1", "general", true)]));
        channels.replace(directory(&[channel("C2", "random", true)]));

        assert!(channels.get("C1").is_none());
        assert_eq!(channels.len(), 1);
    }

    #[test]
    fn test_unknown_keys_resolve_to_placeholders() {
        let channels = ChannelDirectory::new();
        let users = UserDirectory::new();
        assert_eq!(channels.display_name("C404"), UNKNOWN_CHANNEL);
        assert_eq!(users.display_name("U404"), UNKNOWN_USER);
    }

    #[test]
    fn test_member_channels_sorted() {
        let mut channels = ChannelDirectory::new();
        channels.replace(directory(&[
            channel("C3", "zeta", true),
            channel("C1", "alpha", true),
            channel("C2", "hidden", false),
        ]));

        let names: Vec<&str> = channels
            .member_channels()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_user_display_name_prefers_real_name() {
        let mut users = UserDirectory::new();
        users.replace(HashMap::from([
            (
                "U1".to_string(),
                User {
                    id: "U1".to_string(),
                    name: "alice".to_string(),
                    real_name: "Alice Liddell".to_string(),
                    ..User::default()
                },
            ),
            (
                "U2".to_string(),
                User {
                    id: "U2".to_string(),
                    name: "bob".to_string(),
                    ..User::default()
                },
            ),
        ]));

        assert_eq!(users.display_name("U1"), "Alice Liddell");
        assert_eq!(users.display_name("U2"), "bob");
    }
}
