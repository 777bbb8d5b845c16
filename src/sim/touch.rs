//! Touch reducer
//!
//! Turns finger events into pond changes. Begin/move only track where each
//! finger is (for the ghost duck under it); the decision happens on lift.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameState, TouchId};
use super::zone::Zone;
use crate::audio::{AudioChannelManager, Routing};
use crate::consts::RIPPLE_LIFETIME;
use crate::haptics::{Feedback, Haptics};
use crate::sched::{Scheduler, Task};
use crate::settings::SoundBoard;

/// Raw input from the platform layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TouchEvent {
    Began { id: TouchId, pos: Vec2 },
    Moved { id: TouchId, pos: Vec2 },
    Ended { id: TouchId },
    Cancelled { id: TouchId },
}

/// What a single event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// Finger position recorded
    Tracked,
    /// Event named a finger we don't know
    Stale,
    /// A duck landed
    Landed { duck: u32 },
    /// Tap missed the pond; game is now failed
    Missed,
    /// Lift while already failed; nothing happened
    Suppressed,
    /// Finger dropped without classification
    Released,
}

/// Everything a touch can poke besides the state itself
pub struct Effects<'a> {
    pub audio: &'a mut AudioChannelManager,
    pub scheduler: &'a mut Scheduler,
    pub haptics: &'a mut dyn Haptics,
    pub sounds: &'a SoundBoard,
}

/// Route one event to its handler
pub fn apply(state: &mut GameState, event: TouchEvent, fx: &mut Effects<'_>) -> TouchOutcome {
    match event {
        TouchEvent::Began { id, pos } => touch_began(state, id, pos),
        TouchEvent::Moved { id, pos } => touch_moved(state, id, pos),
        TouchEvent::Ended { id } => touch_ended(state, id, fx),
        TouchEvent::Cancelled { id } => touch_cancelled(state, id),
    }
}

pub fn touch_began(state: &mut GameState, id: TouchId, pos: Vec2) -> TouchOutcome {
    state.touches.insert(id, pos);
    TouchOutcome::Tracked
}

pub fn touch_moved(state: &mut GameState, id: TouchId, pos: Vec2) -> TouchOutcome {
    match state.touches.get_mut(&id) {
        Some(tracked) => {
            *tracked = pos;
            TouchOutcome::Tracked
        }
        None => {
            log::trace!("Move for unknown touch {id}");
            TouchOutcome::Stale
        }
    }
}

/// Finger lifted: land a duck, fail, or (if already failed) nothing
pub fn touch_ended(state: &mut GameState, id: TouchId, fx: &mut Effects<'_>) -> TouchOutcome {
    let Some(pos) = state.touches.remove(&id) else {
        log::trace!("End for unknown touch {id}");
        return TouchOutcome::Stale;
    };

    if state.failed {
        return TouchOutcome::Suppressed;
    }

    match state.region.classify(pos) {
        Zone::Inside => {
            let duck = state.spawn_duck(pos, fx.scheduler.now());
            fx.scheduler
                .schedule(RIPPLE_LIFETIME, Task::ExpireRipple { id: duck });
            let cue = &fx.sounds.drop;
            fx.audio.play_one_shot(&cue.key, cue.volume, fx.scheduler);
            fx.haptics.emit(Feedback::Light);
            log::debug!("Duck {duck} landed at ({:.1}, {:.1})", pos.x, pos.y);
            TouchOutcome::Landed { duck }
        }
        Zone::Outside => {
            state.failed = true;
            let failure = &fx.sounds.failure;
            fx.audio
                .play_one_shot(&failure.key, failure.volume, fx.scheduler);
            let distortion = &fx.sounds.distortion;
            fx.audio
                .play_looped(&distortion.key, distortion.volume, Routing::Playback);
            fx.haptics.emit(Feedback::Error);
            log::info!("Missed the pond at ({:.1}, {:.1})", pos.x, pos.y);
            TouchOutcome::Missed
        }
    }
}

/// Cancelled touches only clean up; they never land or fail
pub fn touch_cancelled(state: &mut GameState, id: TouchId) -> TouchOutcome {
    match state.touches.remove(&id) {
        Some(_) => TouchOutcome::Released,
        None => TouchOutcome::Stale,
    }
}

/// Clear the failure. Only does anything while failed; returns whether it did.
pub fn reset(state: &mut GameState, fx: &mut Effects<'_>) -> bool {
    if !state.failed {
        return false;
    }

    fx.audio.stop_loop(&fx.sounds.distortion.key);
    fx.audio.stop_all_one_shots();
    let cleared = state.ducks.len();
    state.clear_pond();
    fx.haptics.emit(Feedback::Medium);
    log::info!("Pond reset ({cleared} duck(s) cleared)");
    true
}

/// Ripple timer fired. The ripple may already be gone after a reset.
pub fn expire_ripple(state: &mut GameState, id: u32) {
    if !state.remove_ripple(id) {
        log::trace!("Ripple {id} already gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::zone::PlayRegion;
    use crate::testing::{RecordingBackend, RecordingHaptics};

    struct Rig {
        state: GameState,
        audio: AudioChannelManager,
        scheduler: Scheduler,
        haptics: RecordingHaptics,
        sounds: SoundBoard,
        backend: RecordingBackend,
    }

    impl Rig {
        fn new() -> Self {
            let backend = RecordingBackend::new(0.3);
            Self {
                state: GameState::new(
                    12345,
                    PlayRegion::from_container(Vec2::ZERO, Vec2::new(400.0, 400.0)),
                ),
                audio: AudioChannelManager::new(Box::new(backend.clone())),
                scheduler: Scheduler::new(),
                haptics: RecordingHaptics::new(),
                sounds: SoundBoard::default(),
                backend,
            }
        }

        fn send(&mut self, event: TouchEvent) -> TouchOutcome {
            let mut fx = Effects {
                audio: &mut self.audio,
                scheduler: &mut self.scheduler,
                haptics: &mut self.haptics,
                sounds: &self.sounds,
            };
            apply(&mut self.state, event, &mut fx)
        }

        fn tap(&mut self, id: TouchId, pos: Vec2) -> TouchOutcome {
            self.send(TouchEvent::Began { id, pos });
            self.send(TouchEvent::Ended { id })
        }

        fn reset(&mut self) -> bool {
            let mut fx = Effects {
                audio: &mut self.audio,
                scheduler: &mut self.scheduler,
                haptics: &mut self.haptics,
                sounds: &self.sounds,
            };
            reset(&mut self.state, &mut fx)
        }

        fn run_until(&mut self, until: f64) {
            while let Some(task) = self.scheduler.pop_due(until) {
                match task {
                    Task::ExpireRipple { id } => expire_ripple(&mut self.state, id),
                    Task::FadeStep {
                        key,
                        playback,
                        volume,
                        last,
                    } => self.audio.apply_fade_step(&key, playback, volume, last),
                    Task::OneShotFinished { playback } => self.audio.finish_one_shot(playback),
                }
            }
            self.scheduler.advance_clock(until);
        }
    }

    const INSIDE: Vec2 = Vec2::new(200.0, 200.0);
    const OUTSIDE: Vec2 = Vec2::new(5.0, 5.0);

    #[test]
    fn test_begin_and_move_track_position() {
        let mut rig = Rig::new();
        rig.send(TouchEvent::Began { id: 1, pos: INSIDE });
        assert_eq!(
            rig.send(TouchEvent::Moved { id: 1, pos: OUTSIDE }),
            TouchOutcome::Tracked
        );
        assert_eq!(rig.state.touches.get(&1), Some(&OUTSIDE));

        assert_eq!(
            rig.send(TouchEvent::Moved { id: 2, pos: INSIDE }),
            TouchOutcome::Stale
        );
        assert!(!rig.state.touches.contains_key(&2));
    }

    #[test]
    fn test_classification_uses_last_position() {
        let mut rig = Rig::new();
        rig.send(TouchEvent::Began { id: 1, pos: OUTSIDE });
        rig.send(TouchEvent::Moved { id: 1, pos: INSIDE });
        assert!(matches!(
            rig.send(TouchEvent::Ended { id: 1 }),
            TouchOutcome::Landed { .. }
        ));
        assert!(!rig.state.failed);
    }

    #[test]
    fn test_inside_lift_lands_duck() {
        let mut rig = Rig::new();
        let outcome = rig.tap(1, INSIDE);

        assert!(matches!(outcome, TouchOutcome::Landed { .. }));
        assert_eq!(rig.state.ducks.len(), 1);
        assert_eq!(rig.state.ripples.len(), 1);
        assert_eq!(rig.state.ducks[0].pos, INSIDE);
        assert!(rig.state.touches.is_empty());
        assert_eq!(rig.backend.starts_of(&rig.sounds.drop.key), 1);
        assert_eq!(rig.haptics.levels(), vec![Feedback::Light]);
    }

    #[test]
    fn test_outside_lift_fails() {
        let mut rig = Rig::new();
        assert_eq!(rig.tap(1, OUTSIDE), TouchOutcome::Missed);

        assert!(rig.state.failed);
        assert!(rig.state.ducks.is_empty());
        assert!(rig.audio.is_looping(&rig.sounds.distortion.key));
        assert_eq!(
            rig.audio
                .loop_channel(&rig.sounds.distortion.key)
                .unwrap()
                .routing,
            Routing::Playback
        );
        assert_eq!(rig.backend.starts_of(&rig.sounds.failure.key), 1);
        assert_eq!(rig.haptics.levels(), vec![Feedback::Error]);
    }

    #[test]
    fn test_fail_is_sticky() {
        let mut rig = Rig::new();
        rig.tap(1, OUTSIDE);
        assert_eq!(rig.tap(2, OUTSIDE), TouchOutcome::Suppressed);
        assert_eq!(rig.tap(3, INSIDE), TouchOutcome::Suppressed);

        assert!(rig.state.failed);
        assert!(rig.state.ducks.is_empty());
        assert!(rig.state.touches.is_empty());
        assert_eq!(rig.backend.starts_of(&rig.sounds.failure.key), 1);
        assert_eq!(rig.backend.starts_of(&rig.sounds.distortion.key), 1);
        assert_eq!(rig.backend.starts_of(&rig.sounds.drop.key), 0);
        assert_eq!(rig.haptics.levels(), vec![Feedback::Error]);
    }

    #[test]
    fn test_stale_end_is_harmless() {
        let mut rig = Rig::new();
        assert_eq!(rig.send(TouchEvent::Ended { id: 9 }), TouchOutcome::Stale);
        assert!(rig.state.ducks.is_empty());
        assert!(!rig.state.failed);
        assert!(rig.haptics.levels().is_empty());
    }

    #[test]
    fn test_cancel_never_classifies() {
        let mut rig = Rig::new();
        rig.send(TouchEvent::Began { id: 1, pos: OUTSIDE });
        assert_eq!(
            rig.send(TouchEvent::Cancelled { id: 1 }),
            TouchOutcome::Released
        );
        rig.send(TouchEvent::Began { id: 2, pos: INSIDE });
        rig.send(TouchEvent::Cancelled { id: 2 });

        assert!(!rig.state.failed);
        assert!(rig.state.ducks.is_empty());
        assert!(rig.state.touches.is_empty());
        assert_eq!(
            rig.send(TouchEvent::Cancelled { id: 2 }),
            TouchOutcome::Stale
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut rig = Rig::new();
        rig.tap(1, INSIDE);
        rig.tap(2, Vec2::new(210.0, 190.0));
        rig.tap(3, OUTSIDE);
        assert!(rig.audio.one_shot_count() > 0);

        assert!(rig.reset());
        assert!(!rig.state.failed);
        assert!(rig.state.ducks.is_empty());
        assert!(rig.state.ripples.is_empty());
        assert!(!rig.audio.is_looping(&rig.sounds.distortion.key));
        assert_eq!(rig.audio.one_shot_count(), 0);
        assert_eq!(rig.haptics.count(Feedback::Medium), 1);

        // Playable again
        assert!(matches!(rig.tap(4, INSIDE), TouchOutcome::Landed { .. }));
    }

    #[test]
    fn test_reset_while_playing_is_a_no_op() {
        let mut rig = Rig::new();
        rig.tap(1, INSIDE);
        assert!(!rig.reset());
        assert_eq!(rig.state.ducks.len(), 1);
        assert_eq!(rig.haptics.count(Feedback::Medium), 0);
    }

    #[test]
    fn test_ripple_expires_on_time() {
        let mut rig = Rig::new();
        rig.run_until(1.0);
        rig.tap(1, INSIDE);
        rig.run_until(1.0 + RIPPLE_LIFETIME - 0.01);
        assert_eq!(rig.state.ripples.len(), 1);
        assert_eq!(rig.state.ripples[0].born_at, 1.0);

        rig.run_until(1.0 + RIPPLE_LIFETIME);
        assert!(rig.state.ripples.is_empty());
        assert_eq!(rig.state.ducks.len(), 1);
    }

    #[test]
    fn test_ripple_timer_after_reset_is_ignored() {
        let mut rig = Rig::new();
        rig.tap(1, INSIDE);
        rig.tap(2, OUTSIDE);
        rig.reset();
        rig.run_until(0.1);
        let duck = match rig.tap(3, INSIDE) {
            TouchOutcome::Landed { duck } => duck,
            other => panic!("expected landing, got {other:?}"),
        };

        // First ripple's timer fires on an empty slot, the new one survives
        rig.run_until(RIPPLE_LIFETIME + 0.05);
        assert_eq!(rig.state.ripples.len(), 1);
        assert_eq!(rig.state.ripples[0].id, duck);
    }
}
