//! Audio channel manager
//!
//! Two layers on top of an [`AudioBackend`]:
//! - Loop channels, at most one per sound key (ambience, distortion)
//! - One-shots, any number of independent instances (drop, failure)
//!
//! Audio never fails loudly: a missing asset or a backend that refuses to
//! start is logged and the request becomes a no-op.

pub mod backend;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use backend::{AudioBackend, FileBackend, PlayRequest, Playback};

use crate::consts::FADE_STEPS;
use crate::sched::{Scheduler, Task};

/// An audio resource addressed by file name and extension
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SoundKey {
    pub name: String,
    pub ext: String,
}

impl SoundKey {
    pub fn new(name: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ext: ext.into(),
        }
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.ext)
    }
}

/// Whether the device mute switch silences a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Routing {
    /// Silenced by the mute switch, mixes with other apps
    #[default]
    Ambient,
    /// Always audible
    Playback,
}

/// Handle to one playing instance, allocated by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

/// Reasons a sound could not be started
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("sound resource {key} not found")]
    ResourceNotFound { key: SoundKey },
    #[error("could not start {key}: {reason}")]
    PlaybackInit { key: SoundKey, reason: String },
}

/// A live looping channel
#[derive(Debug, Clone, PartialEq)]
pub struct LoopChannel {
    pub playback: PlaybackId,
    /// Requested volume before master scaling
    pub volume: f32,
    pub routing: Routing,
}

/// A live one-shot instance
#[derive(Debug, Clone, PartialEq)]
pub struct OneShot {
    pub key: SoundKey,
    pub playback: PlaybackId,
}

/// Owns every playing sound. One per process, passed by reference to
/// whoever needs to make noise.
pub struct AudioChannelManager {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    loops: BTreeMap<SoundKey, LoopChannel>,
    one_shots: BTreeMap<PlaybackId, OneShot>,
}

impl AudioChannelManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            master_volume: 1.0,
            loops: BTreeMap::new(),
            one_shots: BTreeMap::new(),
        }
    }

    /// Set master volume (0.0 - 1.0); live loops pick it up immediately
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = unit_volume(vol);
        let master = self.master_volume;
        for channel in self.loops.values() {
            self.backend
                .set_volume(channel.playback, unit_volume(channel.volume * master));
        }
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    fn effective_volume(&self, volume: f32) -> f32 {
        unit_volume(volume * self.master_volume)
    }

    // === Loops ===

    /// Start a repeating channel for `key`. Does nothing if one already
    /// exists: no restart, no volume change.
    pub fn play_looped(&mut self, key: &SoundKey, volume: f32, routing: Routing) {
        if self.loops.contains_key(key) {
            log::debug!("Loop {key} already playing");
            return;
        }

        let volume = unit_volume(volume);
        let request = PlayRequest {
            key,
            volume: self.effective_volume(volume),
            looped: true,
            routing,
        };
        match self.backend.start(&request) {
            Ok(playback) => {
                log::info!("Loop {key} started ({routing:?}, volume {volume:.2})");
                self.loops.insert(
                    key.clone(),
                    LoopChannel {
                        playback: playback.id,
                        volume,
                        routing,
                    },
                );
            }
            Err(e) => log::warn!("Loop not started: {e}"),
        }
    }

    /// Stop and drop the channel for `key`, if any
    pub fn stop_loop(&mut self, key: &SoundKey) {
        if let Some(channel) = self.loops.remove(key) {
            self.backend.stop(channel.playback);
            log::info!("Loop {key} stopped");
        }
    }

    /// Ramp every live loop to silence over `duration` seconds in
    /// [`FADE_STEPS`] steps, then stop it.
    ///
    /// Each step carries an absolute volume computed from the channel's volume
    /// at the time of this call. Calling again before a fade finishes queues a
    /// second ramp for the same channel; the two interleave and whichever
    /// reaches its last step first stops the channel.
    pub fn fade_out_all_loops(&mut self, duration: f64, sched: &mut Scheduler) {
        if duration <= 0.0 {
            let keys: Vec<SoundKey> = self.loops.keys().cloned().collect();
            for key in &keys {
                self.stop_loop(key);
            }
            return;
        }

        for (key, channel) in &self.loops {
            log::debug!("Fading {key} over {duration:.2}s");
            for step in 1..=FADE_STEPS {
                let frac = step as f32 / FADE_STEPS as f32;
                sched.schedule(
                    duration * step as f64 / FADE_STEPS as f64,
                    Task::FadeStep {
                        key: key.clone(),
                        playback: channel.playback,
                        volume: channel.volume * (1.0 - frac),
                        last: step == FADE_STEPS,
                    },
                );
            }
        }
    }

    /// Run one queued fade step. Ignored if the channel is gone or was
    /// replaced by a new playback under the same key.
    pub fn apply_fade_step(&mut self, key: &SoundKey, playback: PlaybackId, volume: f32, last: bool) {
        let scaled = self.effective_volume(volume);
        let Some(channel) = self.loops.get_mut(key) else {
            return;
        };
        if channel.playback != playback {
            return;
        }

        if last {
            self.stop_loop(key);
        } else {
            channel.volume = volume;
            self.backend.set_volume(playback, scaled);
        }
    }

    pub fn is_looping(&self, key: &SoundKey) -> bool {
        self.loops.contains_key(key)
    }

    pub fn loop_channel(&self, key: &SoundKey) -> Option<&LoopChannel> {
        self.loops.get(key)
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    // === One-shots ===

    /// Fire a sound once. Every call is a separate instance; it leaves the
    /// active set when the scheduler reports it finished.
    pub fn play_one_shot(
        &mut self,
        key: &SoundKey,
        volume: f32,
        sched: &mut Scheduler,
    ) -> Option<PlaybackId> {
        let request = PlayRequest {
            key,
            volume: self.effective_volume(volume),
            looped: false,
            routing: Routing::Ambient,
        };
        let playback = match self.backend.start(&request) {
            Ok(playback) => playback,
            Err(e) => {
                log::warn!("One-shot not played: {e}");
                return None;
            }
        };

        self.one_shots.insert(
            playback.id,
            OneShot {
                key: key.clone(),
                playback: playback.id,
            },
        );
        match playback.duration {
            Some(secs) => sched.schedule(
                secs,
                Task::OneShotFinished {
                    playback: playback.id,
                },
            ),
            None => log::debug!("One-shot {key} has no known length, held until stopped"),
        }
        Some(playback.id)
    }

    /// Completion callback for a one-shot. Ignored if it was already stopped.
    pub fn finish_one_shot(&mut self, playback: PlaybackId) {
        if let Some(shot) = self.one_shots.remove(&playback) {
            self.backend.stop(playback);
            log::debug!("One-shot {} finished", shot.key);
        }
    }

    /// Cut every live one-shot
    pub fn stop_all_one_shots(&mut self) {
        let shots = std::mem::take(&mut self.one_shots);
        if !shots.is_empty() {
            log::debug!("Stopping {} one-shot(s)", shots.len());
        }
        for id in shots.into_keys() {
            self.backend.stop(id);
        }
    }

    pub fn one_shot_count(&self) -> usize {
        self.one_shots.len()
    }

    pub fn one_shots(&self) -> impl Iterator<Item = &OneShot> {
        self.one_shots.values()
    }
}

/// Clamp into 0..=1; NaN and infinities are silence
fn unit_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
