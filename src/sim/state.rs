//! Pond state and entity types
//!
//! Everything the presentation layer draws from lives here.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::zone::PlayRegion;
use crate::consts::*;

/// Platform-assigned token for one finger
pub type TouchId = u64;

/// Per-duck looks, rolled once when the duck lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cosmetics {
    /// Tilt in degrees
    pub rotation: f32,
    /// Facing left instead of right
    pub mirrored: bool,
    /// Sprite size in points
    pub size: f32,
}

impl Cosmetics {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            rotation: rng.random_range(-DUCK_ROTATION_RANGE..=DUCK_ROTATION_RANGE),
            mirrored: rng.random_bool(DUCK_MIRROR_CHANCE),
            size: rng.random_range(DUCK_MIN_SIZE..=DUCK_MAX_SIZE),
        }
    }
}

/// A rubber duck sitting in the pond
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duck {
    pub id: u32,
    pub pos: Vec2,
    pub looks: Cosmetics,
}

/// Splash ring under a freshly dropped duck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ripple {
    /// Same id as the duck that made it
    pub id: u32,
    pub pos: Vec2,
    /// Scheduler time when it appeared
    pub born_at: f64,
}

/// Complete pond state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Ducks in landing order
    pub ducks: Vec<Duck>,
    /// Live ripples in creation order
    pub ripples: Vec<Ripple>,
    /// Fingers currently down
    pub touches: BTreeMap<TouchId, Vec2>,
    /// Sticky until reset
    pub failed: bool,
    /// Where ducks may land
    pub region: PlayRegion,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, region: PlayRegion) -> Self {
        Self {
            ducks: Vec::new(),
            ripples: Vec::new(),
            touches: BTreeMap::new(),
            failed: false,
            region,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID. Never reused, even across resets.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop a duck and its ripple at `pos`; returns the shared id
    pub fn spawn_duck(&mut self, pos: Vec2, now: f64) -> u32 {
        let id = self.next_entity_id();
        let looks = Cosmetics::roll(&mut self.rng);
        self.ducks.push(Duck { id, pos, looks });
        self.ripples.push(Ripple {
            id,
            pos,
            born_at: now,
        });
        id
    }

    /// Remove the ripple with `id`; false if it was already gone
    pub fn remove_ripple(&mut self, id: u32) -> bool {
        let before = self.ripples.len();
        self.ripples.retain(|r| r.id != id);
        self.ripples.len() != before
    }

    /// Clear ducks, ripples and the fail flag together
    pub fn clear_pond(&mut self) {
        self.ducks.clear();
        self.ripples.clear();
        self.failed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> PlayRegion {
        PlayRegion::from_container(Vec2::ZERO, Vec2::new(400.0, 400.0))
    }

    #[test]
    fn test_spawn_pairs_duck_and_ripple() {
        let mut state = GameState::new(7, region());
        let id = state.spawn_duck(Vec2::new(200.0, 200.0), 1.5);

        assert_eq!(state.ducks.len(), 1);
        assert_eq!(state.ripples.len(), 1);
        assert_eq!(state.ducks[0].id, id);
        assert_eq!(state.ripples[0].id, id);
        assert_eq!(state.ripples[0].born_at, 1.5);
    }

    #[test]
    fn test_cosmetics_in_range() {
        let mut state = GameState::new(1, region());
        for _ in 0..200 {
            state.spawn_duck(Vec2::ZERO, 0.0);
        }
        for duck in &state.ducks {
            assert!(duck.looks.rotation.abs() <= DUCK_ROTATION_RANGE);
            assert!((DUCK_MIN_SIZE..=DUCK_MAX_SIZE).contains(&duck.looks.size));
        }
        assert!(state.ducks.iter().any(|d| d.looks.mirrored));
        assert!(state.ducks.iter().any(|d| !d.looks.mirrored));
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999, region());
        let mut b = GameState::new(99999, region());
        for i in 0..10 {
            let pos = Vec2::splat(i as f32);
            a.spawn_duck(pos, 0.0);
            b.spawn_duck(pos, 0.0);
        }
        assert_eq!(a.ducks, b.ducks);
    }

    #[test]
    fn test_ids_survive_clear() {
        let mut state = GameState::new(3, region());
        let first = state.spawn_duck(Vec2::ZERO, 0.0);
        state.failed = true;
        state.clear_pond();

        assert!(state.ducks.is_empty());
        assert!(state.ripples.is_empty());
        assert!(!state.failed);
        assert!(state.spawn_duck(Vec2::ZERO, 0.0) > first);
    }

    #[test]
    fn test_remove_ripple() {
        let mut state = GameState::new(3, region());
        let id = state.spawn_duck(Vec2::ZERO, 0.0);
        assert!(state.remove_ripple(id));
        assert!(!state.remove_ripple(id));
        assert_eq!(state.ducks.len(), 1);
    }
}
