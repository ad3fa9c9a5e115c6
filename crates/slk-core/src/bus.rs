//! Fan-in event bus.
//!
//! Any number of producers post onto one bounded queue drained by a single
//! consumer. Events from one poster keep their order; nothing is promised
//! across posters. The queue closes once every [`EventPoster`] is dropped and
//! the backlog is drained.

use std::fmt;

use tokio::sync::mpsc;

use crate::event::Event;

pub const DEFAULT_CAPACITY: usize = 1024;

/// The consumer is gone; the event was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusClosed;

impl fmt::Display for BusClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("event bus closed")
    }
}

impl std::error::Error for BusClosed {}

/// Consumer end.
#[derive(Debug)]
pub struct EventBus {
    rx: mpsc::Receiver<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> (Self, EventPoster) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { rx }, EventPoster { tx })
    }

    /// Next event, or `None` once all posters are gone and the queue is empty.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Producer end. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventPoster {
    tx: mpsc::Sender<Event>,
}

impl EventPoster {
    /// Waits for queue space if the bus is saturated.
    pub async fn post(&self, event: Event) -> Result<(), BusClosed> {
        self.tx.send(event).await.map_err(|_| BusClosed)
    }

    /// Blocking variant for producers on plain OS threads. Must not be called
    /// from inside the async runtime.
    pub fn blocking_post(&self, event: Event) -> Result<(), BusClosed> {
        self.tx.blocking_send(event).map_err(|_| BusClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A handle that does not keep the bus open.
    pub fn downgrade(&self) -> WeakEventPoster {
        WeakEventPoster {
            tx: self.tx.downgrade(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeakEventPoster {
    tx: mpsc::WeakSender<Event>,
}

impl WeakEventPoster {
    /// `None` once every strong poster is gone.
    pub fn upgrade(&self) -> Option<EventPoster> {
        self.tx.upgrade().map(|tx| EventPoster { tx })
    }
}
