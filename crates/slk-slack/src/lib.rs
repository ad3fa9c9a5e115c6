//! Slack backend for slk.
//!
//! [`SlackClient`] implements [`slk_core::RemoteClient`] over the Slack Web
//! API (bearer token plus the `d` session cookie) and the RTM websocket.

mod client;
pub mod rtm;
mod types;

pub use client::{SlackClient, SlackCredentials};
pub use types::{RtmConnect, RtmSelf};
