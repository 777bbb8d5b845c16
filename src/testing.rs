//! Recording doubles for the audio backend and haptics sink
//!
//! Both are cheap `Rc` handles: hand one clone to the code under test and keep
//! the other to inspect what happened.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::audio::{AudioBackend, AudioError, PlayRequest, Playback, PlaybackId, SoundKey};
use crate::haptics::{Feedback, Haptics};

#[derive(Debug, Clone, PartialEq)]
pub struct Started {
    pub id: PlaybackId,
    pub key: SoundKey,
    pub volume: f32,
    pub looped: bool,
}

#[derive(Debug, Default)]
struct BackendLog {
    clip_secs: f64,
    next_id: u64,
    refuse: bool,
    missing: BTreeSet<SoundKey>,
    started: Vec<Started>,
    volumes: Vec<(PlaybackId, f32)>,
    stopped: Vec<PlaybackId>,
}

/// Backend that accepts everything (unless told otherwise) and remembers it
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<BackendLog>>,
}

impl RecordingBackend {
    /// Every one-shot reports a clip length of `clip_secs`
    pub fn new(clip_secs: f64) -> Self {
        let backend = Self::default();
        backend.log.borrow_mut().clip_secs = clip_secs;
        backend
    }

    pub fn mark_missing(&self, key: &SoundKey) {
        self.log.borrow_mut().missing.insert(key.clone());
    }

    /// Make every start fail as if the audio device was unavailable
    pub fn refuse_all(&self, refuse: bool) {
        self.log.borrow_mut().refuse = refuse;
    }

    pub fn started(&self) -> Vec<Started> {
        self.log.borrow().started.clone()
    }

    pub fn starts_of(&self, key: &SoundKey) -> usize {
        self.log
            .borrow()
            .started
            .iter()
            .filter(|s| &s.key == key)
            .count()
    }

    pub fn start_volume(&self, id: PlaybackId) -> Option<f32> {
        self.log
            .borrow()
            .started
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.volume)
    }

    pub fn volumes_of(&self, id: PlaybackId) -> Vec<f32> {
        self.log
            .borrow()
            .volumes
            .iter()
            .filter(|(v_id, _)| *v_id == id)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn was_stopped(&self, id: PlaybackId) -> bool {
        self.log.borrow().stopped.contains(&id)
    }
}

impl AudioBackend for RecordingBackend {
    fn start(&mut self, request: &PlayRequest<'_>) -> Result<Playback, AudioError> {
        let mut log = self.log.borrow_mut();
        if log.refuse {
            return Err(AudioError::PlaybackInit {
                key: request.key.clone(),
                reason: "device unavailable".to_string(),
            });
        }
        if log.missing.contains(request.key) {
            return Err(AudioError::ResourceNotFound {
                key: request.key.clone(),
            });
        }

        log.next_id += 1;
        let id = PlaybackId(log.next_id);
        log.started.push(Started {
            id,
            key: request.key.clone(),
            volume: request.volume,
            looped: request.looped,
        });
        Ok(Playback {
            id,
            duration: (!request.looped).then_some(log.clip_secs),
        })
    }

    fn set_volume(&mut self, playback: PlaybackId, volume: f32) {
        self.log.borrow_mut().volumes.push((playback, volume));
    }

    fn stop(&mut self, playback: PlaybackId) {
        self.log.borrow_mut().stopped.push(playback);
    }
}

/// Haptics sink that keeps every level it was given
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    levels: Rc<RefCell<Vec<Feedback>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Vec<Feedback> {
        self.levels.borrow().clone()
    }

    pub fn count(&self, level: Feedback) -> usize {
        self.levels.borrow().iter().filter(|l| **l == level).count()
    }
}

impl Haptics for RecordingHaptics {
    fn emit(&mut self, level: Feedback) {
        self.levels.borrow_mut().push(level);
    }
}
