//! Session core for the slk terminal chat client.
//!
//! Terminal input, the remote messaging stream and background task results
//! are all converted to [`Event`]s, fanned into one [`EventBus`] and handled
//! one at a time by the [`Session`] loop. Handlers mutate [`SessionState`] and
//! return [`Effect`]s; the loop executes the effects and repaints.

pub mod bus;
pub mod command;
pub mod directory;
pub mod dispatch;
pub mod effects;
pub mod event;
pub mod handlers;
pub mod history;
pub mod identity;
pub mod input;
pub mod remote;
pub mod screen;
pub mod session;
pub mod state;
pub mod task;
pub mod tasks;

pub use bus::{EventBus, EventPoster, WeakEventPoster};
pub use dispatch::Dispatcher;
pub use effects::Effect;
pub use event::{Event, RemoteEvent, TerminalEvent};
pub use identity::EventIdentity;
pub use remote::{RemoteClient, RemoteError};
pub use screen::{Screen, Viewport};
pub use session::{Session, Shutdown};
pub use state::{ChannelState, SessionState};
