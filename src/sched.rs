//! Deferred task queue on a virtual clock
//!
//! Everything runs on one logical thread. Ripple expiry, fade steps and
//! one-shot completion are queued here and handed back to the owner when the
//! clock passes their deadline. Equal deadlines come out in scheduling order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::audio::{PlaybackId, SoundKey};

/// A deferred callback. Targets are named by id so a task whose target has
/// already gone away can be dropped by the receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Remove the ripple with this id, if it still exists
    ExpireRipple { id: u32 },
    /// Set a fading loop to `volume`; the final step stops the channel
    FadeStep {
        key: SoundKey,
        playback: PlaybackId,
        volume: f32,
        last: bool,
    },
    /// A one-shot played to its end
    OneShotFinished { playback: PlaybackId },
}

#[derive(Debug)]
struct Entry {
    deadline: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest deadline, then the lowest seq
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .total_cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Virtual clock plus pending tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `task` to run `delay` seconds from now
    pub fn schedule(&mut self, delay: f64, task: Task) {
        let deadline = self.now + delay.max(0.0);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            deadline,
            seq,
            task,
        });
    }

    /// Pop the next task due at or before `until`, moving the clock to its deadline
    pub fn pop_due(&mut self, until: f64) -> Option<Task> {
        if self.queue.peek()?.deadline > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.deadline);
        Some(entry.task)
    }

    /// Move the clock forward without running anything. Never goes backwards.
    pub fn advance_clock(&mut self, to: f64) {
        self.now = self.now.max(to);
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.deadline)
    }
}
