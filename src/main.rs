use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arcade_shooter::input::{spawn_reader, KeyTracker};
use arcade_shooter::session::{run, Session};
use arcade_shooter::sprites::Sprites;

#[derive(Parser)]
#[command(name = "arcade_shooter")]
#[command(about = "Single-screen terminal shooter: dodge and destroy the falling enemies")]
struct Args {
    /// Frames per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Seed for enemy and background placement (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding player.txt, enemy.txt, bullet.txt and marker.txt
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// The game owns the terminal, so logs only go to a file when one is given.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Everything after raw mode is enabled, so the caller can always restore
/// the terminal however this ends.
fn play<W: Write>(
    out: &mut W,
    keyboard_enhanced: bool,
    rng: StdRng,
    sprites: &Sprites,
    frame: Duration,
) -> anyhow::Result<()> {
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    let keys = if keyboard_enhanced {
        out.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        KeyTracker::with_release_events()
    } else {
        KeyTracker::new()
    };
    info!(keyboard_enhanced, "terminal ready");

    let rx = spawn_reader().ok_or_else(|| anyhow!("terminal input is already being read"))?;
    let mut session = Session::with_tracker(rng, keys);
    run(out, &mut session, &rx, sprites, frame).context("game loop failed")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sprites = match &args.sprites {
        Some(dir) => Sprites::load(dir),
        None => Sprites::default(),
    };
    let frame = Duration::from_secs(1) / args.fps;
    info!(fps = args.fps, seed = ?args.seed, "starting");

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode().context("enabling raw mode")?;
    // Kitty-protocol terminals report key release; others fall back to expiry.
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);

    let result = play(&mut out, keyboard_enhanced, rng, &sprites, frame);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
