//! Duck Pond - tap the pond, drop a rubber duck
//!
//! Core modules:
//! - `sim`: Game state, play-region classification and the touch reducer
//! - `audio`: Looping channels and one-shot sound effects
//! - `sched`: Virtual-clock task queue for deferred callbacks
//! - `haptics`: Feedback levels sent to the device
//! - `router`: Onboarding/game screen switch owning everything above
//! - `settings`: Data-driven volumes, sound keys and play-area size

pub mod audio;
pub mod haptics;
pub mod router;
pub mod sched;
pub mod settings;
pub mod sim;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use audio::{AudioChannelManager, AudioError, Routing, SoundKey};
pub use haptics::{Feedback, Haptics};
pub use router::{Pond, Screen, Snapshot};
pub use sched::{Scheduler, Task};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Container dimension is divided by this to get the ellipse radius
    pub const REGION_SHRINK: f32 = 2.1;

    /// Seconds a ripple stays alive after a duck lands
    pub const RIPPLE_LIFETIME: f64 = 0.4;

    /// Discrete volume steps in a loop fade-out
    pub const FADE_STEPS: u32 = 8;

    /// Duck cosmetics, rolled once per duck
    pub const DUCK_ROTATION_RANGE: f32 = 20.0; // degrees either way
    pub const DUCK_MIN_SIZE: f32 = 70.0;
    pub const DUCK_MAX_SIZE: f32 = 110.0;
    pub const DUCK_MIRROR_CHANCE: f64 = 0.5;
}
