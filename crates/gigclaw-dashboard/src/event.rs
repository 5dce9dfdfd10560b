//! Terminal input handling
//!
//! Maps crossterm key and resize events to [`Msg`]s and forwards them from a
//! dedicated input thread into the dashboard's message channel.

use crate::app::Msg;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Check if a key event is a quit command (q, Esc or Ctrl+C)
pub fn is_quit_event(key: KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
    ) || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Check if a key event is a refresh command (r or F5)
pub fn is_refresh_event(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::F(5))
}

/// Check if a key event is a tab forward command (Tab or Right)
pub fn is_next_tab_event(key: KeyEvent) -> bool {
    (key.code == KeyCode::Tab && !key.modifiers.contains(KeyModifiers::SHIFT))
        || key.code == KeyCode::Right
}

/// Check if a key event is a tab backward command (Shift+Tab or Left)
pub fn is_prev_tab_event(key: KeyEvent) -> bool {
    key.code == KeyCode::BackTab
        || (key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT))
        || key.code == KeyCode::Left
}

pub fn is_help_event(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('?')
}

/// Translate a key press into a message, if it is bound
pub fn key_to_msg(key: KeyEvent) -> Option<Msg> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_quit_event(key) {
        Some(Msg::Quit)
    } else if is_refresh_event(key) {
        Some(Msg::Refresh)
    } else if is_prev_tab_event(key) {
        Some(Msg::PrevTab)
    } else if is_next_tab_event(key) {
        Some(Msg::NextTab)
    } else if is_help_event(key) {
        Some(Msg::ShowHelp)
    } else {
        None
    }
}

/// Translate any terminal event into a message, if relevant
pub fn event_to_msg(event: Event) -> Option<Msg> {
    match event {
        Event::Key(key) => key_to_msg(key),
        Event::Resize(width, height) => Some(Msg::Resize { width, height }),
        _ => None,
    }
}

/// Wait up to one poll interval for a terminal event
fn next_terminal_event() -> io::Result<Option<Event>> {
    if event::poll(POLL_INTERVAL)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Forward events from `next` until the receiver closes or input fails
///
/// A failing input source sends `Msg::Quit` so the dashboard shuts down
/// instead of running on without a keyboard.
fn pump_events<F>(tx: &UnboundedSender<Msg>, mut next: F)
where
    F: FnMut() -> io::Result<Option<Event>>,
{
    while !tx.is_closed() {
        match next() {
            Ok(Some(ev)) => {
                if let Some(msg) = event_to_msg(ev) {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Terminal input failed, quitting: {}", e);
                let _ = tx.send(Msg::Quit);
                break;
            }
        }
    }
}

/// Read terminal events on a background thread until the receiver closes
pub fn spawn_input_reader(tx: UnboundedSender<Msg>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        pump_events(&tx, next_terminal_event);
        tracing::debug!("Input reader stopped");
    })
}
