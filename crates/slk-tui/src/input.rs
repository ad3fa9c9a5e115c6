//! Terminal input polling.
//!
//! crossterm's poll/read are blocking, so a dedicated thread converts
//! terminal events and posts them onto the session bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self as term, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use slk_core::EventPoster;
use slk_core::event::{Event, Key, NamedKey, TerminalEvent};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Converts a crossterm event. Key releases yield `None`.
pub fn convert_event(event: term::Event) -> Option<TerminalEvent> {
    match event {
        term::Event::Key(key) if key.kind == KeyEventKind::Release => None,
        term::Event::Key(key) => {
            Some(convert_key(key).map_or(TerminalEvent::Other, TerminalEvent::Key))
        }
        term::Event::Resize(width, height) => Some(TerminalEvent::Resize { width, height }),
        _ => Some(TerminalEvent::Other),
    }
}

fn convert_key(key: KeyEvent) -> Option<Key> {
    let named = |named| Some(Key::Named(named));
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Key::Ctrl(c.to_ascii_lowercase()))
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => Some(Key::Alt(c)),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => named(NamedKey::Enter),
        KeyCode::Backspace => named(NamedKey::Backspace),
        KeyCode::Esc => named(NamedKey::Escape),
        KeyCode::Tab => named(NamedKey::Tab),
        KeyCode::BackTab => named(NamedKey::BackTab),
        KeyCode::Delete => named(NamedKey::Delete),
        KeyCode::Insert => named(NamedKey::Insert),
        KeyCode::Up => named(NamedKey::Up),
        KeyCode::Down => named(NamedKey::Down),
        KeyCode::Left => named(NamedKey::Left),
        KeyCode::Right => named(NamedKey::Right),
        KeyCode::Home => named(NamedKey::Home),
        KeyCode::End => named(NamedKey::End),
        KeyCode::PageUp => named(NamedKey::PageUp),
        KeyCode::PageDown => named(NamedKey::PageDown),
        KeyCode::F(n) => named(NamedKey::F(n)),
        _ => None,
    }
}

/// Background thread forwarding terminal input. Stopped and joined on drop.
pub struct InputPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputPoller {
    pub fn spawn(poster: EventPoster) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("slk-input".to_string())
            .spawn(move || poll_loop(&poster, &thread_stop))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for InputPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn poll_loop(poster: &EventPoster, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match term::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => {
                if poster.is_closed() {
                    break;
                }
                continue;
            }
            Err(err) => {
                warn!(error = %err, "terminal poll failed");
                break;
            }
        }

        let event = match term::read() {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "terminal read failed");
                break;
            }
        };
        let Some(event) = convert_event(event) else {
            continue;
        };
        if poster.blocking_post(Event::Terminal(event)).is_err() {
            break;
        }
    }
    debug!("input poller stopped");
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> term::Event {
        term::Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_and_chord_keys() {
        assert_eq!(
            convert_event(press(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(TerminalEvent::Key(Key::Char('a')))
        );
        assert_eq!(
            convert_event(press(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(TerminalEvent::Key(Key::Char('A')))
        );
        assert_eq!(
            convert_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(TerminalEvent::Key(Key::Ctrl('c')))
        );
        assert_eq!(
            convert_event(press(KeyCode::Char('x'), KeyModifiers::ALT)),
            Some(TerminalEvent::Key(Key::Alt('x')))
        );
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(
            convert_event(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(TerminalEvent::Key(Key::Named(NamedKey::Enter)))
        );
        assert_eq!(
            convert_event(press(KeyCode::Esc, KeyModifiers::NONE)),
            Some(TerminalEvent::Key(Key::Named(NamedKey::Escape)))
        );
        assert_eq!(
            convert_event(press(KeyCode::F(2), KeyModifiers::NONE)),
            Some(TerminalEvent::Key(Key::Named(NamedKey::F(2))))
        );
    }

    #[test]
    fn test_release_is_dropped() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(convert_event(term::Event::Key(release)), None);
    }

    #[test]
    fn test_resize_and_other() {
        assert_eq!(
            convert_event(term::Event::Resize(120, 40)),
            Some(TerminalEvent::Resize {
                width: 120,
                height: 40
            })
        );
        assert_eq!(
            convert_event(term::Event::FocusGained),
            Some(TerminalEvent::Other)
        );
        assert_eq!(
            convert_event(press(KeyCode::CapsLock, KeyModifiers::NONE)),
            Some(TerminalEvent::Other)
        );
    }
}
