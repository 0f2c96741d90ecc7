//! BLOCKFALL - headless autoplay host
//!
//! Runs one game against the wall clock with a random autoplayer, logs to
//! a file in the temp directory, and records the best score in settings.

use blockfall::settings::{Settings, record_best_score};
use blockfall::{Action, Game, GameEvent, RealtimeScheduler};
use rand::Rng;
use std::io;
use std::time::{Duration, Instant};

/// Relative weights for autoplayer commands
const ACTION_WEIGHTS: [(Action, u32); 4] = [
    (Action::MoveLeft, 3),
    (Action::MoveRight, 3),
    (Action::Rotate, 2),
    (Action::SoftDrop, 6),
];

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn pick_action(rng: &mut impl Rng) -> Action {
    let total: u32 = ACTION_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (action, weight) in ACTION_WEIGHTS {
        if roll < weight {
            return action;
        }
        roll -= weight;
    }
    Action::SoftDrop
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();

    // Setup tracing to log file
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blockfall=debug"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();
    let action_interval = Duration::from_millis(settings.autoplay.action_interval_ms);
    let mut rng = rand::thread_rng();

    let mut game = Game::new(settings.game_config(), RealtimeScheduler::new());
    let mut next_action = Instant::now() + action_interval;

    println!("Autoplaying, best so far: {}", settings.best_score());

    let final_score = loop {
        game.pump();

        if Instant::now() >= next_action {
            let action = pick_action(&mut rng);
            let changed = game.process_action(action);
            tracing::trace!(?action, changed, "autoplay");
            next_action += action_interval;
        }

        let mut finished = None;
        for event in game.drain_events() {
            match event {
                GameEvent::RowsCleared { rows, points } => {
                    println!("Cleared {} row(s) for {} points", rows, points);
                }
                GameEvent::LevelUp { level } => println!("Level {}", level),
                GameEvent::GameOver { final_score } => finished = Some(final_score),
            }
        }
        if let Some(score) = finished {
            break score;
        }

        // Sleep until whichever comes first: the next timer or the next move
        let wake = game
            .scheduler()
            .next_deadline()
            .map_or(next_action, |deadline| deadline.min(next_action));
        std::thread::sleep(wake.saturating_duration_since(Instant::now()));
    };

    let snapshot = game.snapshot();
    drop(game);

    println!("\nGame over! Final score: {}", final_score);
    println!("Level: {} | Lines: {}", snapshot.level, snapshot.lines);
    if record_best_score(&mut settings, final_score) {
        println!("New best score!");
    }
    tracing::debug!(
        "final snapshot: {}",
        serde_json::to_string(&snapshot).unwrap_or_default()
    );

    if let Err(e) = settings.save() {
        tracing::warn!("could not save settings: {}", e);
        eprintln!("Warning: Could not save settings: {}", e);
    }
    tracing::info!(best = settings.best_score(), "exiting");

    Ok(())
}
