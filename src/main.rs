//! Duck Pond entry point
//!
//! Headless driver: replays a touch script against the pond and prints the
//! final snapshot as JSON.
//!
//! Usage: `duck-pond [settings.json] [script.json]`

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;

use duck_pond::audio::FileBackend;
use duck_pond::haptics::LogHaptics;
use duck_pond::sim::TouchEvent;
use duck_pond::{Pond, Settings};

/// One scripted user action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Action {
    Confirm,
    Touch { event: TouchEvent },
    Tap { id: u64, x: f32, y: f32 },
    Reset,
    Resize { width: f32, height: f32 },
}

#[derive(Debug, Clone, Deserialize)]
struct Step {
    /// Seconds since start
    at: f64,
    #[serde(flatten)]
    action: Action,
}

/// Built-in session: confirm, land two ducks, miss, miss again, reset
fn demo_script() -> Vec<Step> {
    let step = |at: f64, action: Action| Step { at, action };
    vec![
        step(0.5, Action::Confirm),
        step(1.0, Action::Tap { id: 1, x: 200.0, y: 200.0 }),
        step(1.2, Action::Tap { id: 2, x: 150.0, y: 260.0 }),
        step(2.0, Action::Tap { id: 3, x: 4.0, y: 390.0 }),
        step(2.5, Action::Tap { id: 4, x: 398.0, y: 2.0 }),
        step(3.0, Action::Reset),
        step(3.5, Action::Tap { id: 5, x: 220.0, y: 180.0 }),
    ]
}

#[derive(Debug, thiserror::Error)]
enum ScriptError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid script {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn load_script(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn play(pond: &mut Pond, mut script: Vec<Step>) {
    script.sort_by(|a, b| a.at.total_cmp(&b.at));
    for step in script {
        pond.advance_to(step.at);
        match step.action {
            Action::Confirm => {
                pond.confirm();
            }
            Action::Touch { event } => {
                let outcome = pond.handle_touch(event);
                log::debug!("t={:.2} {event:?} -> {outcome:?}", step.at);
            }
            Action::Tap { id, x, y } => {
                let pos = Vec2::new(x, y);
                pond.handle_touch(TouchEvent::Began { id, pos });
                let outcome = pond.handle_touch(TouchEvent::Ended { id });
                log::info!("t={:.2} tap ({x}, {y}) -> {outcome:?}", step.at);
            }
            Action::Reset => {
                if !pond.reset() {
                    log::info!("t={:.2} reset ignored (not failed)", step.at);
                }
            }
            Action::Resize { width, height } => pond.set_container(width, height),
        }
    }
    // Let ripples and fades settle
    pond.advance(2.0);
}

fn main() {
    env_logger::init();
    log::info!("Duck Pond (headless) starting...");

    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let settings = match args.next() {
        Some(path) => Settings::load(&path),
        None => Settings::default(),
    };
    let script = match args.next() {
        Some(path) => match load_script(&path) {
            Ok(script) => script,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => demo_script(),
    };

    let backend = FileBackend::new(&settings.asset_dir, settings.fallback_clip_secs);
    let mut pond = Pond::new(settings, Box::new(backend), Box::new(LogHaptics));
    play(&mut pond, script);

    let snapshot = pond.snapshot();
    log::info!(
        "Finished at t={:.2}: {} duck(s), failed={}",
        snapshot.time,
        snapshot.ducks.len(),
        snapshot.failed
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize snapshot: {e}"),
    }
}
