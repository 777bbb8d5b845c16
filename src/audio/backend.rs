//! Playback backends
//!
//! The manager only needs three things from a backend: start a sound, change
//! its volume, stop it. How the samples reach a speaker is not our business.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{AudioError, PlaybackId, Routing, SoundKey};

/// What to start
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    pub key: &'a SoundKey,
    /// Already scaled by master volume (0.0 - 1.0)
    pub volume: f32,
    pub looped: bool,
    pub routing: Routing,
}

/// A started sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub id: PlaybackId,
    /// Clip length in seconds, if known. Loops ignore it.
    pub duration: Option<f64>,
}

pub trait AudioBackend {
    fn start(&mut self, request: &PlayRequest<'_>) -> Result<Playback, AudioError>;
    fn set_volume(&mut self, playback: PlaybackId, volume: f32);
    fn stop(&mut self, playback: PlaybackId);
}

/// Resolves sounds to `<root>/<name>.<ext>` and tracks them as playing.
///
/// Produces no sound itself. WAV headers are read for clip length so
/// one-shots finish on time; other formats use `fallback_clip_secs`.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    fallback_clip_secs: f64,
    next_id: u64,
    live: BTreeMap<PlaybackId, SoundKey>,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>, fallback_clip_secs: f64) -> Self {
        Self {
            root: root.into(),
            fallback_clip_secs,
            next_id: 1,
            live: BTreeMap::new(),
        }
    }

    pub fn path_for(&self, key: &SoundKey) -> PathBuf {
        self.root.join(format!("{}.{}", key.name, key.ext))
    }

    /// Number of sounds started and not yet stopped
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn clip_length(&self, key: &SoundKey, path: &Path) -> Result<f64, AudioError> {
        if !key.ext.eq_ignore_ascii_case("wav") {
            return Ok(self.fallback_clip_secs);
        }
        let reader = hound::WavReader::open(path).map_err(|e| AudioError::PlaybackInit {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(AudioError::PlaybackInit {
                key: key.clone(),
                reason: "zero sample rate".to_string(),
            });
        }
        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }
}

impl AudioBackend for FileBackend {
    fn start(&mut self, request: &PlayRequest<'_>) -> Result<Playback, AudioError> {
        let path = self.path_for(request.key);
        if !path.is_file() {
            return Err(AudioError::ResourceNotFound {
                key: request.key.clone(),
            });
        }
        let duration = self.clip_length(request.key, &path)?;

        let id = PlaybackId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, request.key.clone());
        log::debug!(
            "Playing {} (id {}, volume {:.2}, looped {})",
            path.display(),
            id.0,
            request.volume,
            request.looped
        );

        Ok(Playback {
            id,
            duration: (!request.looped).then_some(duration),
        })
    }

    fn set_volume(&mut self, playback: PlaybackId, volume: f32) {
        if let Some(key) = self.live.get(&playback) {
            log::trace!("{key} volume -> {volume:.3}");
        }
    }

    fn stop(&mut self, playback: PlaybackId) {
        if let Some(key) = self.live.remove(&playback) {
            log::debug!("Stopped {key} (id {})", playback.0);
        }
    }
}
