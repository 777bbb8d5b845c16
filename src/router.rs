//! Screen router
//!
//! Owns the pond, the audio manager, the scheduler and the haptics sink, and
//! switches between the onboarding screen and the game. The only way out of
//! onboarding is `confirm`; there is no way back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioBackend, AudioChannelManager, Routing};
use crate::haptics::{Feedback, Haptics};
use crate::sched::{Scheduler, Task};
use crate::settings::Settings;
use crate::sim::{self, Duck, Effects, GameState, PlayRegion, Ripple, TouchEvent, TouchId, TouchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Onboarding,
    Game,
}

/// A finger and where it is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedTouch {
    pub id: TouchId,
    pub pos: Vec2,
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub screen: Screen,
    pub time: f64,
    pub ducks: Vec<Duck>,
    pub ripples: Vec<Ripple>,
    pub touches: Vec<TrackedTouch>,
    pub failed: bool,
}

/// The whole app core
pub struct Pond {
    screen: Screen,
    state: GameState,
    audio: AudioChannelManager,
    scheduler: Scheduler,
    haptics: Box<dyn Haptics>,
    settings: Settings,
}

impl Pond {
    /// Start on the onboarding screen with its ambience playing
    pub fn new(settings: Settings, backend: Box<dyn AudioBackend>, haptics: Box<dyn Haptics>) -> Self {
        let settings = settings.sanitized();
        let region = region_for(settings.container);
        let mut audio = AudioChannelManager::new(backend);
        audio.set_master_volume(settings.master_volume);

        let cue = &settings.sounds.onboarding_loop;
        audio.play_looped(&cue.key, cue.volume, Routing::Ambient);
        log::info!("Pond ready (seed {}, container {:?})", settings.seed, settings.container);

        Self {
            screen: Screen::Onboarding,
            state: GameState::new(settings.seed, region),
            audio,
            scheduler: Scheduler::new(),
            haptics,
            settings,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn audio(&self) -> &AudioChannelManager {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Leave onboarding for the game. Onboarding loops fade out, the game
    /// ambience starts. Does nothing once in the game.
    pub fn confirm(&mut self) -> bool {
        if self.screen != Screen::Onboarding {
            return false;
        }

        self.haptics.emit(Feedback::Soft);
        self.audio
            .fade_out_all_loops(self.settings.handoff_fade_secs, &mut self.scheduler);
        if let Some(cue) = &self.settings.sounds.game_loop {
            self.audio.play_looped(&cue.key, cue.volume, Routing::Ambient);
        }
        self.screen = Screen::Game;
        log::info!("Entered game at t={:.2}", self.scheduler.now());
        true
    }

    /// Feed one touch event. Ignored on the onboarding screen.
    pub fn handle_touch(&mut self, event: TouchEvent) -> TouchOutcome {
        if self.screen != Screen::Game {
            return TouchOutcome::Stale;
        }
        let mut fx = Effects {
            audio: &mut self.audio,
            scheduler: &mut self.scheduler,
            haptics: &mut *self.haptics,
            sounds: &self.settings.sounds,
        };
        sim::apply(&mut self.state, event, &mut fx)
    }

    /// Tap on the failure overlay
    pub fn reset(&mut self) -> bool {
        let mut fx = Effects {
            audio: &mut self.audio,
            scheduler: &mut self.scheduler,
            haptics: &mut *self.haptics,
            sounds: &self.settings.sounds,
        };
        sim::reset(&mut self.state, &mut fx)
    }

    /// Container was resized; the pond follows
    pub fn set_container(&mut self, width: f32, height: f32) {
        self.settings.container = [width.max(0.0), height.max(0.0)];
        self.state.region = region_for(self.settings.container);
        log::debug!("Container resized to {width}x{height}");
    }

    /// Run every task due up to `dt` seconds from now
    pub fn advance(&mut self, dt: f64) {
        let until = self.scheduler.now() + dt.max(0.0);
        self.advance_to(until);
    }

    /// Run every task due at or before `until`, then park the clock there
    pub fn advance_to(&mut self, until: f64) {
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run(task);
        }
        self.scheduler.advance_clock(until);
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::ExpireRipple { id } => sim::expire_ripple(&mut self.state, id),
            Task::FadeStep {
                key,
                playback,
                volume,
                last,
            } => self.audio.apply_fade_step(&key, playback, volume, last),
            Task::OneShotFinished { playback } => self.audio.finish_one_shot(playback),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            screen: self.screen,
            time: self.scheduler.now(),
            ducks: self.state.ducks.clone(),
            ripples: self.state.ripples.clone(),
            touches: self
                .state
                .touches
                .iter()
                .map(|(&id, &pos)| TrackedTouch { id, pos })
                .collect(),
            failed: self.state.failed,
        }
    }
}

fn region_for(container: [f32; 2]) -> PlayRegion {
    PlayRegion::from_container(Vec2::ZERO, Vec2::from(container))
}
