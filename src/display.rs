//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::entities::{GameState, Rect};
use crate::sprites::Sprites;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_MARKER: Color = Color::DarkGrey;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_HUD_HIGH: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_BULLET: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps the logical play field onto the terminal grid.  Row 0 holds the
/// HUD and the last row the controls hint; the field fills the rows between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub field_w: f32,
    pub field_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, field_w: f32, field_h: f32) -> Self {
        Viewport { cols, rows, field_w, field_h }
    }

    fn field_rows(&self) -> u16 {
        self.rows.saturating_sub(2)
    }

    /// Terminal cell of a logical point, or `None` if it lies off the field.
    pub fn project(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.field_w || y >= self.field_h {
            return None;
        }
        let col = (x / self.field_w * self.cols as f32) as u16;
        let row = (y / self.field_h * self.field_rows() as f32) as u16;
        if col >= self.cols || row >= self.field_rows() {
            return None;
        }
        Some((col, row + 1))
    }

    fn project_center(&self, rect: &Rect) -> Option<(u16, u16)> {
        self.project(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    sprites: &Sprites,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    // The finished round stays visible behind the overlay, dimmed.
    if state.is_over() {
        out.queue(style::SetAttribute(Attribute::Dim))?;
    }

    draw_background(out, state, sprites, view)?;
    draw_glyph(out, view, &state.player.rect, sprites.player.as_deref(), C_PLAYER)?;
    for bullet in &state.bullets {
        draw_glyph(out, view, &bullet.rect, sprites.bullet.as_deref(), C_BULLET)?;
    }
    for enemy in &state.enemies {
        draw_glyph(out, view, &enemy.rect, sprites.enemy.as_deref(), C_ENEMY)?;
    }

    out.queue(style::SetAttribute(Attribute::Reset))?;

    draw_hud(out, state, view)?;
    draw_controls_hint(out, view)?;

    if state.is_over() {
        draw_game_over(out, state, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Field ─────────────────────────────────────────────────────────────────────

fn draw_background<W: Write>(
    out: &mut W,
    state: &GameState,
    sprites: &Sprites,
    view: &Viewport,
) -> std::io::Result<()> {
    let Some(glyph) = sprites.marker.as_deref() else {
        return Ok(());
    };
    for m in &state.markers {
        let rect = Rect::new(m.x, m.y, m.size, m.size);
        draw_glyph(out, view, &rect, Some(glyph), C_MARKER)?;
    }
    Ok(())
}

/// Print `glyph` centred on the rectangle.  Missing sprites and off-field
/// rectangles draw nothing.
fn draw_glyph<W: Write>(
    out: &mut W,
    view: &Viewport,
    rect: &Rect,
    glyph: Option<&str>,
    color: Color,
) -> std::io::Result<()> {
    let Some(glyph) = glyph else {
        return Ok(());
    };
    let Some((col, row)) = view.project_center(rect) else {
        return Ok(());
    };
    let half = glyph.chars().count() as u16 / 2;
    out.queue(cursor::MoveTo(col.saturating_sub(half), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    // Score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score: {:>6}", state.score)))?;

    // HP — centre
    let hp_text = format!("HP: {:>3}", state.hp);
    let hx = (view.cols / 2).saturating_sub(hp_text.len() as u16 / 2);
    out.queue(cursor::MoveTo(hx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(&hp_text))?;

    // High score — right
    let high_text = format!("High: {:>6}", state.high_score);
    let rx = view.cols.saturating_sub(high_text.len() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HIGH))?;
    out.queue(Print(&high_text))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("Arrows / WASD : Move   SPACE : Shoot   R : Restart   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let score_line = format!("Final Score: {}", state.score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║    GAME  OVER    ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    out.queue(style::SetAttribute(Attribute::Bold))?;
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    out.queue(style::SetAttribute(Attribute::Reset))?;

    Ok(())
}
