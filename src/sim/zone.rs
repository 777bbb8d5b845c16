//! Play-region classification
//!
//! The pond is an axis-aligned ellipse inscribed (with a margin) in its
//! container. A tap is in the pond when its normalized squared distance from
//! the centre is at most 1; the rim itself counts as inside.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::REGION_SHRINK;

/// Which side of the rim a point is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Inside,
    Outside,
}

/// Axis-aligned ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayRegion {
    pub center: Vec2,
    /// Half-axes (x, y)
    pub radii: Vec2,
}

impl PlayRegion {
    pub fn new(center: Vec2, radii: Vec2) -> Self {
        Self { center, radii }
    }

    /// Ellipse for a container with top-left `origin` and `size`
    pub fn from_container(origin: Vec2, size: Vec2) -> Self {
        Self {
            center: origin + size / 2.0,
            radii: size / REGION_SHRINK,
        }
    }

    /// Sum of squared per-axis normalized offsets; 1.0 on the rim
    pub fn normalized_distance_sq(&self, point: Vec2) -> f32 {
        let d = point - self.center;
        let nx = normalize_axis(d.x, self.radii.x);
        let ny = normalize_axis(d.y, self.radii.y);
        nx * nx + ny * ny
    }

    #[inline]
    pub fn classify(&self, point: Vec2) -> Zone {
        classify(point, self)
    }
}

/// Offset over radius. A collapsed axis only admits the centre line.
#[inline]
fn normalize_axis(offset: f32, radius: f32) -> f32 {
    if radius > 0.0 {
        offset / radius
    } else if offset == 0.0 {
        0.0
    } else {
        f32::INFINITY
    }
}

/// Classify `point` against `region`
pub fn classify(point: Vec2, region: &PlayRegion) -> Zone {
    // NaN compares false, so garbage input lands outside
    if region.normalized_distance_sq(point) <= 1.0 {
        Zone::Inside
    } else {
        Zone::Outside
    }
}
