//! Fixed-step integration for orbiting planets and rockets.
//!
//! Planets move on circular orbits about the origin. Instead of re-deriving
//! the orbit angle every tick, each body carries a [`FixedRotation`] built
//! once from its orbit speed and applied as a rigid transform per step.
//!
//! Rockets have no velocity state: every step they move along their launch
//! heading and then receive the summed gravity displacement.

use bevy::math::DVec2;
use wide::f64x4;

use super::gravity::{attract_all, attract_all_x4};
use crate::types::DEG_TO_RAD;

// =============================================================================
// Rotation
// =============================================================================

/// A precomputed rotation about the origin.
///
/// Rotates clockwise for positive angles, matching [`heading`](crate::types::heading):
/// rotating `heading(a)` by `b` yields `heading(a + b)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRotation {
    cos: f64,
    sin: f64,
}

impl FixedRotation {
    pub const IDENTITY: Self = Self { cos: 1.0, sin: 0.0 };

    pub fn from_degrees(angle_deg: f64) -> Self {
        let (sin, cos) = (angle_deg * DEG_TO_RAD).sin_cos();
        Self { cos, sin }
    }

    /// Rotation covered in one step by a body orbiting at `orbit_speed` deg/unit.
    pub fn per_step(orbit_speed: f64, dt: f64) -> Self {
        Self::from_degrees(orbit_speed * dt)
    }

    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x * self.cos + p.y * self.sin, -p.x * self.sin + p.y * self.cos)
    }
}

impl Default for FixedRotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Projectile step
// =============================================================================

/// Advance a projectile by one step.
///
/// `shift` is the heading already scaled by `dt` (see
/// [`DirectionTable`](crate::prediction::DirectionTable)). The projectile moves
/// by `shift * speed`, then gravity from the Sun and `sources` is evaluated at
/// the moved position and applied as a single sum.
#[inline]
pub fn step_projectile<I>(pos: DVec2, shift: DVec2, speed: f64, mass: f64, dt: f64, sources: I) -> DVec2
where
    I: IntoIterator<Item = (DVec2, f64)>,
{
    let moved = pos + shift * speed;
    moved + attract_all(moved, sources, dt, mass)
}

/// Advance four projectiles sharing `speed` and `mass` by one step.
///
/// Lane for lane this matches [`step_projectile`] with `sources` in the
/// same order.
#[inline]
pub fn step_projectiles_x4(
    px: f64x4,
    py: f64x4,
    shift_x: f64x4,
    shift_y: f64x4,
    speed: f64,
    mass: f64,
    dt: f64,
    sources: &[(DVec2, f64)],
) -> (f64x4, f64x4) {
    let speed = f64x4::splat(speed);
    let moved_x = px + shift_x * speed;
    let moved_y = py + shift_y * speed;
    let (gx, gy) = attract_all_x4(moved_x, moved_y, sources, dt, mass);
    (moved_x + gx, moved_y + gy)
}

/// Squared-distance overlap test between two circles.
#[inline]
pub fn overlaps(a: DVec2, b: DVec2, radius_sum: f64) -> bool {
    (a - b).length_squared() < radius_sum * radius_sum
}
