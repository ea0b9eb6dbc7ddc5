//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` (plus the frame timestamp and, where needed, an RNG handle)
//! and returns a brand-new `GameState`.  Side effects are limited to the
//! injected RNG.

use std::collections::HashSet;

use rand::Rng;

use crate::entities::{Bullet, Enemy, GameState, GameStatus, Key, Marker, Player, Rect};

// ── Tuning tables ────────────────────────────────────────────────────────────

/// Logical play-field size.  The renderer scales it onto the terminal grid.
pub const SCREEN_W: f32 = 900.0;
pub const SCREEN_H: f32 = 600.0;

pub const PLAYER_W: f32 = 60.0;
pub const PLAYER_H: f32 = 60.0;
pub const PLAYER_SPEED: f32 = 5.0;
/// Minimum milliseconds between two shots.
pub const FIRE_COOLDOWN: u64 = 200;

pub const BULLET_W: f32 = 10.0;
pub const BULLET_H: f32 = 20.0;
pub const BULLET_SPEED: f32 = 10.0;

pub const ENEMY_W: f32 = 50.0;
pub const ENEMY_H: f32 = 50.0;
pub const ENEMY_MIN_SPEED: f32 = 2.0;
pub const ENEMY_MAX_SPEED: f32 = 4.0;
/// Minimum milliseconds between two enemy spawns.
pub const SPAWN_INTERVAL: u64 = 1000;

pub const MAX_HP: u32 = 100;
/// Hit points lost per enemy that reaches the player.
pub const CONTACT_DAMAGE: u32 = 20;
/// Score awarded per enemy destroyed.
pub const KILL_SCORE: u32 = 10;

pub const MARKER_COUNT: usize = 10;
const MARKER_MARGIN: f32 = 80.0;
const MARKER_MIN_SIZE: f32 = 60.0;
const MARKER_MAX_SIZE: f32 = 100.0;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// True iff the two rectangles overlap on both axes.  Touching edges do not
/// count.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn spawn_player(width: f32, height: f32) -> Player {
    Player {
        rect: Rect::new(width / 2.0 - PLAYER_W / 2.0, height - 100.0, PLAYER_W, PLAYER_H),
        speed: PLAYER_SPEED,
        last_shot: 0,
    }
}

/// Scatter a fresh set of background markers over the play field.
pub fn generate_markers(width: f32, height: f32, rng: &mut impl Rng) -> Vec<Marker> {
    (0..MARKER_COUNT)
        .map(|_| Marker {
            x: rng.gen_range(0.0..(width - MARKER_MARGIN)),
            y: rng.gen_range(0.0..(height - MARKER_MARGIN)),
            size: rng.gen_range(MARKER_MIN_SIZE..MARKER_MAX_SIZE),
        })
        .collect()
}

/// Build the initial game state.  `high_score` carries over from earlier
/// rounds in the same process.
pub fn init_state(width: f32, height: f32, high_score: u32, rng: &mut impl Rng) -> GameState {
    GameState {
        player: spawn_player(width, height),
        bullets: Vec::new(),
        enemies: Vec::new(),
        markers: generate_markers(width, height, rng),
        score: 0,
        high_score,
        hp: MAX_HP,
        status: GameStatus::Running,
        last_spawn: 0,
        held: HashSet::new(),
        width,
        height,
    }
}

/// Start a new round, keeping only the screen size and the best score.
pub fn reset_state(state: &GameState, rng: &mut impl Rng) -> GameState {
    let high_score = state.high_score.max(state.score);
    init_state(state.width, state.height, high_score, rng)
}

// ── Spawner ──────────────────────────────────────────────────────────────────

/// A new enemy just above the top edge at a random column.
pub fn spawn_enemy(width: f32, rng: &mut impl Rng) -> Enemy {
    Enemy {
        rect: Rect::new(rng.gen_range(0.0..=(width - ENEMY_W)), -ENEMY_H, ENEMY_W, ENEMY_H),
        speed: rng.gen_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED),
    }
}

/// Spawn one enemy if at least `SPAWN_INTERVAL` ms passed since the last.
pub fn maybe_spawn(state: &GameState, now: u64, rng: &mut impl Rng) -> GameState {
    if now.saturating_sub(state.last_spawn) < SPAWN_INTERVAL {
        return state.clone();
    }
    let mut enemies = state.enemies.clone();
    enemies.push(spawn_enemy(state.width, rng));
    GameState {
        enemies,
        last_spawn: now,
        ..state.clone()
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Apply every held direction once, clamped to the play field.
pub fn move_player(state: &GameState) -> GameState {
    let p = &state.player;
    let mut rect = p.rect;

    if state.is_held(Key::Left) {
        rect.x = (rect.x - p.speed).max(0.0);
    }
    if state.is_held(Key::Right) {
        rect.x = (rect.x + p.speed).min(state.width - rect.w);
    }
    if state.is_held(Key::Up) {
        rect.y = (rect.y - p.speed).max(0.0);
    }
    if state.is_held(Key::Down) {
        rect.y = (rect.y + p.speed).min(state.height - rect.h);
    }

    GameState {
        player: Player {
            rect,
            ..p.clone()
        },
        ..state.clone()
    }
}

/// Fire a bullet from the player's nose if Fire is held and the cooldown
/// has elapsed.
pub fn player_fire(state: &GameState, now: u64) -> GameState {
    let p = &state.player;
    if !state.is_held(Key::Fire) || now.saturating_sub(p.last_shot) < FIRE_COOLDOWN {
        return state.clone();
    }
    let bullet = Bullet {
        rect: Rect::new(
            p.rect.x + p.rect.w / 2.0 - BULLET_W / 2.0,
            p.rect.y,
            BULLET_W,
            BULLET_H,
        ),
        speed: BULLET_SPEED,
    };
    let mut bullets = state.bullets.clone();
    bullets.push(bullet);
    GameState {
        player: Player {
            last_shot: now,
            ..p.clone()
        },
        bullets,
        ..state.clone()
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by one frame at timestamp `now` (ms since the
/// round started).  All randomness comes through `rng` so callers control
/// determinism (useful for tests with a seeded RNG).
pub fn tick(state: &GameState, now: u64, rng: &mut impl Rng) -> GameState {
    if state.is_over() {
        return state.clone();
    }

    // ── 1. Player movement and fire ──────────────────────────────────────────
    let state = player_fire(&move_player(state), now);

    // ── 2. Move bullets, drop the ones past the top ─────────────────────────
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .filter_map(|b| {
            let y = b.rect.y - b.speed;
            if y < 0.0 {
                None
            } else {
                Some(Bullet {
                    rect: Rect { y, ..b.rect },
                    ..b.clone()
                })
            }
        })
        .collect();

    // ── 3. Spawn ─────────────────────────────────────────────────────────────
    let state = maybe_spawn(&GameState { bullets, ..state }, now, rng);

    // ── 4. Move enemies, drop the ones past the bottom ───────────────────────
    let enemies: Vec<Enemy> = state
        .enemies
        .iter()
        .filter_map(|e| {
            let y = e.rect.y + e.speed;
            if y > state.height {
                None
            } else {
                Some(Enemy {
                    rect: Rect { y, ..e.rect },
                    ..e.clone()
                })
            }
        })
        .collect();

    // ── 5. Collision: bullets ↔ enemies ──────────────────────────────────────
    // Each bullet takes the first live enemy it overlaps, in list order.
    let mut killed = vec![false; enemies.len()];
    let mut spent = vec![false; state.bullets.len()];

    for (bi, bullet) in state.bullets.iter().enumerate() {
        let hit = (0..enemies.len())
            .find(|&ei| !killed[ei] && overlaps(&bullet.rect, &enemies[ei].rect));
        if let Some(ei) = hit {
            killed[ei] = true;
            spent[bi] = true;
        }
    }

    let kills = killed.iter().filter(|&&k| k).count() as u32;

    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .zip(&spent)
        .filter(|&(_, &s)| !s)
        .map(|(b, _)| b.clone())
        .collect();

    // ── 6. Collision: enemies ↔ player ───────────────────────────────────────
    let player_rect = state.player.rect;
    let (rammed, enemies): (Vec<Enemy>, Vec<Enemy>) = enemies
        .into_iter()
        .zip(killed)
        .filter(|(_, k)| !k)
        .map(|(e, _)| e)
        .partition(|e| overlaps(&player_rect, &e.rect));

    // ── 7. Hit points & status ───────────────────────────────────────────────
    let hp = state.hp.saturating_sub(rammed.len() as u32 * CONTACT_DAMAGE);
    let (status, held) = if hp == 0 {
        (GameStatus::GameOver, HashSet::new())
    } else {
        (GameStatus::Running, state.held.clone())
    };

    GameState {
        bullets,
        enemies,
        score: state.score + kills * KILL_SCORE,
        hp,
        status,
        held,
        ..state
    }
}
