//! Session controller: owns the game state, the frame clock and the input
//! tracker, and drives the advance-then-render loop.

use std::io::Write;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::Event;
use crossterm::terminal;
use rand::Rng;
use tracing::{debug, info};

use crate::compute::{init_state, reset_state, tick, SCREEN_H, SCREEN_W};
use crate::display::{self, Viewport};
use crate::entities::GameState;
use crate::input::{Command, KeyTracker};
use crate::sprites::Sprites;

/// Milliseconds since the current round started.  Restarting the clock is
/// how a reset cancels the old timeline: the next frame is timestamp 0 again.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        FrameClock { start: Instant::now() }
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

pub struct Session<R: Rng> {
    state: GameState,
    keys: KeyTracker,
    rng: R,
}

impl<R: Rng> Session<R> {
    pub fn new(rng: R) -> Self {
        Self::with_tracker(rng, KeyTracker::new())
    }

    pub fn with_tracker(mut rng: R, keys: KeyTracker) -> Self {
        let state = init_state(SCREEN_W, SCREEN_H, 0, &mut rng);
        Session { state, keys, rng }
    }

    /// Resume from an existing state, e.g. a prepared scenario.
    pub fn from_state(state: GameState, rng: R) -> Self {
        Session {
            state,
            keys: KeyTracker::new(),
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn keys_mut(&mut self) -> &mut KeyTracker {
        &mut self.keys
    }

    /// Back to a fresh running round.  The high score is kept.
    pub fn reset(&mut self) {
        self.state = reset_state(&self.state, &mut self.rng);
        self.keys.clear();
        info!(high_score = self.state.high_score, "round reset");
    }

    /// Run one simulation step at `now` and fold the score into the high
    /// score.  Does nothing once the round is over.
    pub fn advance(&mut self, now: u64) {
        if self.state.is_over() {
            return;
        }
        self.state.held = self.keys.held(now);
        let next = tick(&self.state, now, &mut self.rng);

        if next.score > next.high_score {
            debug!(score = next.score, "new high score");
        }
        let high_score = next.high_score.max(next.score);
        self.state = GameState { high_score, ..next };

        if self.state.is_over() {
            self.keys.clear();
            info!(score = self.state.score, high_score, "game over");
        }
    }
}

// ── Frame loop ────────────────────────────────────────────────────────────────

enum Flow {
    Quit,
    GameOver,
}

/// Play rounds until the player quits.
///
/// While a round runs, every frame drains pending input, advances the
/// simulation and renders.  Once the round is over no more frames are
/// scheduled: the overlay stays on screen and the loop blocks until the
/// player restarts or quits.
pub fn run<W: Write, R: Rng>(
    out: &mut W,
    session: &mut Session<R>,
    rx: &mpsc::Receiver<Event>,
    sprites: &Sprites,
    frame: Duration,
) -> std::io::Result<()> {
    info!(?frame, "session started");
    loop {
        match frame_loop(out, session, rx, sprites, frame)? {
            Flow::Quit => break,
            Flow::GameOver => {}
        }
        if wait_for_command(out, session, rx, sprites)? == Command::Quit {
            break;
        }
        session.reset();
    }
    info!(high_score = session.state().high_score, "session ended");
    Ok(())
}

fn frame_loop<W: Write, R: Rng>(
    out: &mut W,
    session: &mut Session<R>,
    rx: &mpsc::Receiver<Event>,
    sprites: &Sprites,
    frame: Duration,
) -> std::io::Result<Flow> {
    let mut clock = FrameClock::start();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(key) = ev else { continue };
            match session.keys_mut().handle(&key, clock.now_ms()) {
                Some(Command::Quit) => return Ok(Flow::Quit),
                Some(Command::Restart) => {
                    session.reset();
                    clock.restart();
                }
                None => {}
            }
        }

        session.advance(clock.now_ms());

        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, SCREEN_W, SCREEN_H);
        display::render(out, session.state(), sprites, &view)?;

        if session.state().is_over() {
            return Ok(Flow::GameOver);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            std::thread::sleep(frame - elapsed);
        }
    }
}

/// Block on input until the player restarts or quits, redrawing the final
/// frame when the terminal is resized.  A closed channel counts as quit.
fn wait_for_command<W: Write, R: Rng>(
    out: &mut W,
    session: &mut Session<R>,
    rx: &mpsc::Receiver<Event>,
    sprites: &Sprites,
) -> std::io::Result<Command> {
    while let Ok(ev) = rx.recv() {
        match ev {
            Event::Key(key) => {
                if let Some(cmd) = session.keys_mut().handle(&key, 0) {
                    return Ok(cmd);
                }
            }
            Event::Resize(cols, rows) => {
                let view = Viewport::new(cols, rows, SCREEN_W, SCREEN_H);
                display::render(out, session.state(), sprites, &view)?;
            }
            _ => {}
        }
    }
    Ok(Command::Quit)
}
