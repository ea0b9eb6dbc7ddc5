//! All game entity types — pure data, no logic.

use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Running,
    GameOver,
}

/// Input intents the simulation understands.  Several terminal keys may map
/// to the same intent (arrows and WASD).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in logical screen units.  Origin is the top-left
/// corner; y grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub rect: Rect,
    /// Units travelled upward per frame.
    pub speed: f32,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    /// Units moved per frame for each held direction.
    pub speed: f32,
    /// Timestamp (ms) of the last bullet fired.
    pub last_shot: u64,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    /// Units travelled downward per frame.
    pub speed: f32,
}

// ── Background ────────────────────────────────────────────────────────────────

/// Decorative square drawn behind everything else.  Never collides.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire session state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub markers: Vec<Marker>,
    pub score: u32,
    /// Best score seen in this process; survives resets.
    pub high_score: u32,
    /// Hit points, always within `0..=MAX_HP`.
    pub hp: u32,
    pub status: GameStatus,
    /// Timestamp (ms) of the last enemy spawn.
    pub last_spawn: u64,
    /// Intents currently held down.
    pub held: HashSet<Key>,
    pub width: f32,
    pub height: f32,
}

impl GameState {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}
