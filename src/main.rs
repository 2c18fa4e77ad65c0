//! Sandtrix headless driver: runs a seeded session at a fixed cadence and
//! reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use sandtrix::{Action, Config, Difficulty, GameState, Phase, TICK_DT, parse_script};
use std::path::PathBuf;

/// Headless runner for the sandtrix simulation core.
#[derive(Debug, Parser)]
#[command(
    name = "sandtrix",
    version,
    about = "Run a seeded falling-sand puzzle session without a display.",
    long_about = "Runs the sandtrix simulation headlessly at 60 ticks per second of game time.\n\n\
        Pieces crumble into sand when they lock; a same-colour region touching both side walls \
        is cleared for one point per grain.\n\n\
        SCRIPT (one action per tick):\n  h left   l right   j down   k rotate   (space) hard drop\n  \
        p pause  r resume  s start  x reset  . wait\n\n\
        Set RUST_LOG=info (or debug) to trace locks, clears and state changes."
)]
struct Args {
    /// Playfield width in piece cells (10..=30).
    #[arg(long, default_value = "10", value_name = "COLS")]
    width: usize,

    /// Height / width ratio of the playfield (1.0..=3.0).
    #[arg(long, default_value = "1.5", value_name = "RATIO")]
    aspect: f64,

    /// Difficulty preset: easy (3 colours), normal (5), hard (7).
    #[arg(short, long, default_value = "normal")]
    difficulty: Difficulty,

    /// Number of colours (2..=7). Overrides --difficulty.
    #[arg(long, value_name = "N")]
    colors: Option<u8>,

    /// JSON settings file with "piece_grid_width", "aspect_ratio" and
    /// "color_count". Overrides the size flags.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RNG seed; the same seed and script replay the same game.
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Ticks to simulate (stops early on game over).
    #[arg(short, long, default_value = "3600")]
    ticks: u64,

    /// Action script, one character per tick. When it runs out the session
    /// keeps ticking, hard-dropping every --drop-every ticks.
    #[arg(long, value_name = "STR")]
    script: Option<String>,

    /// Auto hard-drop interval in ticks once the script is exhausted (0 = never).
    #[arg(long, default_value = "90", value_name = "TICKS")]
    drop_every: u64,

    /// Print the final snapshot and game-over record as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => {
            let colors = args.colors.unwrap_or_else(|| args.difficulty.color_count());
            Config::new(args.width, args.aspect, colors)
        }
    };
    let script = match &args.script {
        Some(s) => parse_script(s).context("parsing --script")?,
        None => Vec::new(),
    };

    log::info!(
        "running {} ticks on {}x{} ({} colours), seed {}",
        args.ticks,
        config.piece_grid_width(),
        config.piece_grid_height(),
        config.color_count(),
        args.seed
    );

    let mut game = GameState::new(config, args.seed);
    game.start();
    let mut record = None;

    for t in 0..args.ticks {
        match script.get(t as usize) {
            Some(&action) => game.apply(action),
            None if args.drop_every > 0 && t % args.drop_every == 0 => game.apply(Action::HardDrop),
            None => {}
        }
        game.tick(TICK_DT);
        if let Some(r) = game.take_game_over_record() {
            record = Some(r);
        }
        if game.phase() == Phase::GameOver {
            break;
        }
    }

    if args.json {
        let report = serde_json::json!({
            "ticks": game.ticks(),
            "pieces_locked": game.pieces_locked(),
            "particles_cleared": game.particles_cleared(),
            "snapshot": game.snapshot(),
            "game_over": record,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("phase:             {:?}", game.phase());
        println!("ticks:             {}", game.ticks());
        println!("score:             {}", game.score());
        println!("level:             {}", game.level());
        println!("pieces locked:     {}", game.pieces_locked());
        println!("particles cleared: {}", game.particles_cleared());
        println!("grains on grid:    {}", game.grid().filled_count());
        if let Some(r) = record {
            println!("game over:         {:?} at {}", r.reason, r.timestamp);
        }
    }
    Ok(())
}
