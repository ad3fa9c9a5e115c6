//! `--ls-users` and `--ls-channels`.

use anyhow::{Context, Result};
use slk_core::RemoteClient;
use slk_core::directory::{Channel, ChannelKind, User};
use slk_core::remote;

pub async fn users(remote: &dyn RemoteClient) -> Result<()> {
    let users = remote::load_users(remote)
        .await
        .context("loading users failed")?;
    let mut users: Vec<User> = users.into_values().collect();
    users.sort_by(|a, b| a.real_name.cmp(&b.real_name).then_with(|| a.id.cmp(&b.id)));

    for user in &users {
        println!("{}", user_row(user));
    }
    Ok(())
}

pub async fn channels(remote: &dyn RemoteClient) -> Result<()> {
    let channels = remote::load_channels(remote)
        .await
        .context("loading channels failed")?;
    let mut channels: Vec<Channel> = channels.into_values().collect();
    channels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));

    for row in channels.iter().filter_map(channel_row) {
        println!("{row}");
    }
    Ok(())
}

fn user_row(user: &User) -> String {
    format!("{:>30} {:>40} {:>30}", user.real_name, user.email, user.title)
}

/// `None` for multi-party direct messages, which are not listed.
fn channel_row(channel: &Channel) -> Option<String> {
    if channel.kind == ChannelKind::MultiPartyDirectMessage {
        return None;
    }
    Some(format!(
        "{:>40} {:>8} {:>4} members",
        channel.name,
        channel.visibility.as_str(),
        channel.member_count
    ))
}

#[cfg(test)]
mod tests {
    use slk_core::directory::Visibility;

    use super::*;

    fn channel(name: &str, visibility: Visibility, kind: ChannelKind) -> Channel {
        Channel {
            key: "C1".to_string(),
            name: name.to_string(),
            is_member: true,
            visibility,
            member_count: 12,
            kind,
        }
    }

    #[test]
    fn test_user_row_is_right_aligned() {
        let user = User {
            id: "U1".to_string(),
            name: "alice".to_string(),
            real_name: "Alice Liddell".to_string(),
            email: "alice@example.com".to_string(),
            title: "Engineer".to_string(),
            deleted: false,
        };

        let row = user_row(&user);
        assert_eq!(row.len(), 30 + 1 + 40 + 1 + 30);
        assert!(row.starts_with(' '));
        assert!(row.ends_with(" Engineer"));
        assert!(row.contains("Alice Liddell      "));
    }

    #[test]
    fn test_channel_row() {
        let row = channel_row(&channel("general", Visibility::Public, ChannelKind::PublicChannel))
            .unwrap();
        assert!(row.ends_with(" general   public   12 members"));
        assert_eq!(row.len(), 40 + 1 + 8 + 1 + 4 + " members".len());

        let row = channel_row(&channel("ops", Visibility::Private, ChannelKind::PrivateChannel))
            .unwrap();
        assert!(row.contains("ops  private"));
    }

    #[test]
    fn test_group_dms_are_skipped() {
        let mpim = channel(
            "mpdm-a--b--c-1",
            Visibility::Private,
            ChannelKind::MultiPartyDirectMessage,
        );
        assert_eq!(channel_row(&mpim), None);
    }
}
