//! The four visual resources, as terminal glyph strings.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// A sprite that failed to load is `None` and simply isn't drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprites {
    pub player: Option<String>,
    pub enemy: Option<String>,
    pub bullet: Option<String>,
    pub marker: Option<String>,
}

impl Default for Sprites {
    fn default() -> Self {
        Sprites {
            player: Some("/▲\\".to_string()),
            enemy: Some("<▼>".to_string()),
            bullet: Some("║".to_string()),
            marker: Some("✦".to_string()),
        }
    }
}

impl Sprites {
    /// Load `player.txt`, `enemy.txt`, `bullet.txt` and `marker.txt` from
    /// `dir`.  Only the first line of each file is used.
    pub fn load(dir: &Path) -> Self {
        let sprites = Sprites {
            player: load_glyph(dir, "player"),
            enemy: load_glyph(dir, "enemy"),
            bullet: load_glyph(dir, "bullet"),
            marker: load_glyph(dir, "marker"),
        };
        info!(dir = %dir.display(), "sprites loaded");
        sprites
    }
}

fn load_glyph(dir: &Path, name: &str) -> Option<String> {
    let path = dir.join(format!("{name}.txt"));
    match fs::read_to_string(&path) {
        Ok(text) => {
            let glyph = text.lines().next().unwrap_or("").trim_end().to_string();
            if glyph.is_empty() {
                warn!(path = %path.display(), "sprite file is empty");
                None
            } else {
                Some(glyph)
            }
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "sprite not loaded");
            None
        }
    }
}
