//! Session loop.
//!
//! Owns all session state and is its only writer. Each iteration takes one
//! event (locally queued diagnostics first, then the bus), runs its handler,
//! executes the returned effects and repaints.

use std::collections::VecDeque;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::bus::{DEFAULT_CAPACITY, EventBus, EventPoster, WeakEventPoster};
use crate::dispatch::Dispatcher;
use crate::effects::Effect;
use crate::event::Event;
use crate::remote::RemoteClient;
use crate::screen::Screen;
use crate::state::SessionState;
use crate::tasks;

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// A handler asked to stop.
    Requested,
    /// Every producer stopped and the queue emptied.
    Drained,
}

pub struct Session {
    state: SessionState,
    dispatcher: Dispatcher,
    remote: Arc<dyn RemoteClient>,
    poster: Option<WeakEventPoster>,
    local: VecDeque<Event>,
}

impl Session {
    pub fn new(remote: Arc<dyn RemoteClient>) -> Self {
        Self {
            state: SessionState::default(),
            dispatcher: Dispatcher::new(),
            remote,
            poster: None,
            local: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs until shutdown is requested or every producer is gone.
    ///
    /// The screen stays owned by the caller, which releases it after this
    /// returns, on success and on error alike.
    pub async fn run<S: Screen + ?Sized>(&mut self, screen: &mut S) -> Result<Shutdown> {
        let (mut bus, poster) = EventBus::new(DEFAULT_CAPACITY);
        self.poster = Some(poster.downgrade());
        self.state.viewport = screen.viewport().context("Failed to read terminal size")?;

        screen
            .start_input(poster.clone())
            .context("Failed to start terminal input")?;
        tokio::spawn(tasks::forward_remote(Arc::clone(&self.remote), poster.clone()));
        self.spawn_refresh();
        drop(poster);

        screen.paint(&self.state)?;
        info!("session started");

        loop {
            let event = match self.local.pop_front() {
                Some(event) => event,
                None => match bus.recv().await {
                    Some(event) => event,
                    None => {
                        info!("event bus drained");
                        return Ok(Shutdown::Drained);
                    }
                },
            };

            if let ControlFlow::Break(shutdown) = self.handle_event(event) {
                info!(?shutdown, "session stopping");
                return Ok(shutdown);
            }
            screen.paint(&self.state)?;
        }
    }

    fn handle_event(&mut self, event: Event) -> ControlFlow<Shutdown> {
        let effects = self.dispatcher.dispatch(&mut self.state, event);
        for effect in effects {
            if let ControlFlow::Break(shutdown) = self.execute_effect(effect) {
                return ControlFlow::Break(shutdown);
            }
        }
        ControlFlow::Continue(())
    }

    fn execute_effect(&mut self, effect: Effect) -> ControlFlow<Shutdown> {
        match effect {
            Effect::Emit(event) => self.local.push_back(event),
            Effect::FetchHistory { request, channel } => {
                let remote = Arc::clone(&self.remote);
                self.spawn_effect(move || async move {
                    Some(tasks::fetch_history(remote, request, channel).await)
                });
            }
            Effect::RefreshDirectory => self.spawn_refresh(),
            Effect::PostMessage { channel, text } => {
                let remote = Arc::clone(&self.remote);
                self.spawn_effect(move || tasks::post_message(remote, channel, text));
            }
            Effect::MarkRead { channel, ts } => {
                let remote = Arc::clone(&self.remote);
                self.spawn_effect(move || tasks::mark_read(remote, channel, ts));
            }
            Effect::Shutdown => return ControlFlow::Break(Shutdown::Requested),
        }
        ControlFlow::Continue(())
    }

    fn spawn_refresh(&self) {
        if let Some(poster) = self.upgrade_poster() {
            tokio::spawn(tasks::refresh_directory(Arc::clone(&self.remote), poster));
        }
    }

    fn upgrade_poster(&self) -> Option<EventPoster> {
        let poster = self.poster.as_ref().and_then(WeakEventPoster::upgrade);
        if poster.is_none() {
            warn!("event bus closed, dropping effect");
        }
        poster
    }

    /// Runs `f` in the background and posts its result event, if any.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<Event>> + Send + 'static,
    {
        let Some(poster) = self.upgrade_poster() else {
            return;
        };
        tokio::spawn(async move {
            if let Some(event) = f().await
                && poster.post(event).await.is_err()
            {
                debug!("result dropped, event bus closed");
            }
        });
    }
}
