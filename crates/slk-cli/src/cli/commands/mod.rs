//! CLI command handlers.

pub mod cat;
pub mod chat;
pub mod list;
