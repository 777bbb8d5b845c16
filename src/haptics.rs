//! Haptic feedback levels
//!
//! The core only picks a level; turning it into a buzz is the device's job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// Duck landed
    Light,
    /// Pond reset
    Medium,
    /// Onboarding confirmed
    Soft,
    /// Tap missed the pond
    Error,
}

pub trait Haptics {
    fn emit(&mut self, level: Feedback);
}

/// Writes each feedback level to the log
#[derive(Debug, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn emit(&mut self, level: Feedback) {
        log::debug!("Haptic: {level:?}");
    }
}
