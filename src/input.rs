//! Keyboard handling: turns raw terminal key events into the set of held
//! intents the simulation reads, plus one-shot commands (restart, quit).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::entities::Key;

/// A key counts as held if its last press/repeat arrived within this many
/// milliseconds.  Covers terminals that never report key release: OS key
/// repeat runs at 15 Hz or faster, so a live key is refreshed before expiry.
pub const HOLD_WINDOW_MS: u64 = 150;

/// One-shot actions that bypass the held-key set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Restart,
    Quit,
}

/// Which intent a terminal key drives, if any.
pub fn intent(code: &KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::Down),
        KeyCode::Char(' ') => Some(Key::Fire),
        _ => None,
    }
}

/// Records the last time each key was seen.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (kitty protocol): proper
///   `Press` / `Repeat` / `Release` events, keys are dropped on release.
/// * **Classic terminals**: only `Press` events.  Keys expire after
///   `HOLD_WINDOW_MS` of silence.
#[derive(Debug, Default)]
pub struct KeyTracker {
    last_seen: HashMap<KeyCode, u64>,
    /// Keys stay held until their `Release` arrives; no expiry.
    release_events: bool,
}

impl KeyTracker {
    /// Tracker for terminals without release events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker for terminals that report key release.
    pub fn with_release_events() -> Self {
        KeyTracker {
            release_events: true,
            ..Self::default()
        }
    }

    /// Feed one key event observed at `now` (ms).
    pub fn handle(&mut self, ev: &KeyEvent, now: u64) -> Option<Command> {
        match ev.kind {
            KeyEventKind::Press => {
                self.last_seen.insert(ev.code, now);
                match ev.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
                    KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => {
                        Some(Command::Quit)
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
                    _ => None,
                }
            }
            KeyEventKind::Repeat => {
                self.last_seen.insert(ev.code, now);
                None
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&ev.code);
                None
            }
        }
    }

    /// Intents whose keys are still fresh at `now`.
    pub fn held(&self, now: u64) -> HashSet<Key> {
        self.last_seen
            .iter()
            .filter(|&(_, &seen)| {
                self.release_events || now.saturating_sub(seen) <= HOLD_WINDOW_MS
            })
            .filter_map(|(code, _)| intent(code))
            .collect()
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}

// ── Event reader ──────────────────────────────────────────────────────────────

static READER_STARTED: AtomicBool = AtomicBool::new(false);

/// Start the background thread that blocks on terminal reads and forwards
/// events over a channel, so the frame loop never blocks on I/O.
///
/// Only the first call per process starts a reader; later calls get `None`.
pub fn spawn_reader() -> Option<mpsc::Receiver<Event>> {
    if READER_STARTED.swap(true, Ordering::SeqCst) {
        warn!("input reader already registered");
        return None;
    }

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    debug!("input receiver dropped, reader exiting");
                    break;
                }
            }
            Err(err) => {
                warn!(%err, "terminal read failed, reader exiting");
                break;
            }
        }
    });
    Some(rx)
}
