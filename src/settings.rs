//! Pond settings
//!
//! Volumes, sound keys and play-area geometry. Loaded from a JSON file;
//! anything missing falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::SoundKey;

/// A sound and the volume it plays at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub key: SoundKey,
    pub volume: f32,
}

impl Cue {
    pub fn new(name: &str, ext: &str, volume: f32) -> Self {
        Self {
            key: SoundKey::new(name, ext),
            volume,
        }
    }
}

/// Every sound the pond knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundBoard {
    /// One-shot when a duck lands
    pub drop: Cue,
    /// One-shot when a tap misses the pond
    pub failure: Cue,
    /// Loop held while failed
    pub distortion: Cue,
    /// Loop behind the onboarding screen
    pub onboarding_loop: Cue,
    /// Loop started when the game screen opens
    pub game_loop: Option<Cue>,
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self {
            drop: Cue::new("Duck-Drop", "wav", 0.8),
            failure: Cue::new("Failure", "wav", 1.0),
            distortion: Cue::new("Distortion", "wav", 0.6),
            onboarding_loop: Cue::new("Water-Drops", "wav", 0.5),
            game_loop: Some(Cue::new("Pond-Ambience", "wav", 0.4)),
        }
    }
}

/// Pond settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub sounds: SoundBoard,
    /// Seconds for onboarding loops to fade when the game opens
    pub handoff_fade_secs: f64,
    /// Width and height of the pond container
    pub container: [f32; 2],
    /// Seed for duck cosmetics
    pub seed: u64,
    /// Where sound files live
    pub asset_dir: PathBuf,
    /// Clip length assumed for non-WAV one-shots
    pub fallback_clip_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sounds: SoundBoard::default(),
            handoff_fade_secs: 1.0,
            container: [400.0, 400.0],
            seed: 0x5EED_D0C5,
            asset_dir: PathBuf::from("assets"),
            fallback_clip_secs: 1.0,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, or defaults if it can't be read
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({e}), using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp volumes into 0..=1 and reject negative durations. Anything
    /// non-finite falls back to its default.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.master_volume = unit_or(self.master_volume, defaults.master_volume);
        let sounds = &mut self.sounds;
        let fallback = &defaults.sounds;
        for (cue, default) in [
            (&mut sounds.drop, &fallback.drop),
            (&mut sounds.failure, &fallback.failure),
            (&mut sounds.distortion, &fallback.distortion),
            (&mut sounds.onboarding_loop, &fallback.onboarding_loop),
        ] {
            cue.volume = unit_or(cue.volume, default.volume);
        }
        if let Some(cue) = sounds.game_loop.as_mut() {
            let default = fallback.game_loop.as_ref().map_or(1.0, |c| c.volume);
            cue.volume = unit_or(cue.volume, default);
        }
        self.handoff_fade_secs = non_negative_or(self.handoff_fade_secs, defaults.handoff_fade_secs);
        self.fallback_clip_secs = non_negative_or(self.fallback_clip_secs, defaults.fallback_clip_secs);
        for (side, default) in self.container.iter_mut().zip(defaults.container) {
            *side = if side.is_finite() { side.max(0.0) } else { default };
        }
        self
    }
}

fn unit_or(volume: f32, default: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        default
    }
}

fn non_negative_or(secs: f64, default: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        default
    }
}
