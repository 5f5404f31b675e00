use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use riftkit::{ShutdownSignal, StopReason};
use tracing::{debug, info};

const KEY_POLL: Duration = Duration::from_millis(100);

/// Stop `watch` commands on Ctrl-C, Esc or q.
///
/// Returns the keyboard thread handle. The thread exits once the signal is
/// stopped from any source, or right away when stdin is not a terminal.
pub fn install_shutdown_handlers(shutdown: &ShutdownSignal) -> anyhow::Result<JoinHandle<()>> {
    let on_interrupt = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping...");
        on_interrupt.stop(StopReason::Interrupted);
    })?;

    let monitor = shutdown.clone();
    Ok(thread::spawn(move || watch_keys(&monitor, read_key)))
}

/// Feed keys from `next_key` until a quit key arrives or `shutdown` stops.
/// A read error ends the loop without stopping anything; Ctrl-C still works.
fn watch_keys<F>(shutdown: &ShutdownSignal, mut next_key: F)
where
    F: FnMut(Duration) -> io::Result<Option<KeyEvent>>,
{
    while !shutdown.is_shutdown() {
        match next_key(KEY_POLL) {
            Ok(Some(key)) if is_quit_key(&key) => {
                debug!("Quit key pressed: {:?}", key.code);
                shutdown.stop(StopReason::QuitKey);
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Keyboard unavailable, only Ctrl-C stops the watch: {}", e);
                return;
            }
        }
    }
}

/// Next key press within `timeout`, if any.
fn read_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&key(KeyCode::Esc)));
        assert!(is_quit_key(&key(KeyCode::Char('q'))));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        assert!(!is_quit_key(&key(KeyCode::Char('c'))));
        assert!(!is_quit_key(&key(KeyCode::Enter)));
    }

    #[test]
    fn test_quit_key_stops_signal() {
        let shutdown = ShutdownSignal::new();
        let mut keys: VecDeque<_> = vec![key(KeyCode::Char('x')), key(KeyCode::Esc)].into();

        watch_keys(&shutdown, |_| Ok(keys.pop_front()));

        assert_eq!(shutdown.reason(), Some(StopReason::QuitKey));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_read_error_ends_monitor_without_stopping() {
        let shutdown = ShutdownSignal::new();
        let mut calls = 0;

        watch_keys(&shutdown, |_| {
            calls += 1;
            Err(io::Error::other("not a terminal"))
        });

        assert_eq!(calls, 1);
        assert!(!shutdown.is_shutdown());
    }
}
