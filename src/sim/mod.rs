//! Pond simulation
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Seeded RNG only
//! - Deferred work goes through the scheduler, never a wall clock
//! - Audio and haptics are reached through explicit handles

pub mod state;
pub mod touch;
pub mod zone;

pub use state::{Cosmetics, Duck, GameState, Ripple, TouchId};
pub use touch::{
    Effects, TouchEvent, TouchOutcome, apply, expire_ripple, reset, touch_began, touch_cancelled,
    touch_ended, touch_moved,
};
pub use zone::{PlayRegion, Zone, classify};
