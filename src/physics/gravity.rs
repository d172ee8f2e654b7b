//! Gravity kernel shared by live rockets and the trajectory predictor.
//!
//! Attraction here is a per-step displacement rather than an acceleration:
//! projectiles have no velocity state of their own, they move along their
//! heading and get pulled toward each attractor every tick.

use bevy::math::DVec2;
use wide::f64x4;

use crate::types::{NEAR_FIELD_SQ, SUN_MASS};

/// Displacement an attractor imposes on a point mass over one step.
///
/// # Arguments
/// * `attractor` - Attractor position
/// * `point` - Point mass position
/// * `attractor_scale` - Attractor strength (planet scale, or Sun mass)
/// * `dt` - Step size
/// * `mass` - Mass of the attracted point
///
/// # Returns
/// Displacement to add to `point`. Zero inside the near-field radius.
#[inline]
pub fn attract(attractor: DVec2, point: DVec2, attractor_scale: f64, dt: f64, mass: f64) -> DVec2 {
    let delta = attractor - point;
    let r_squared = delta.length_squared();

    // Clamp the inverse-square singularity.
    if r_squared < NEAR_FIELD_SQ {
        return DVec2::ZERO;
    }

    let magnitude = (mass * attractor_scale) / r_squared;
    delta / r_squared.sqrt() * (magnitude * dt)
}

/// Summed displacement from the Sun and a set of `(position, scale)` attractors.
///
/// Contributions are computed against the same `point` and added together,
/// so the order of `sources` does not change the result beyond rounding.
#[inline]
pub fn attract_all<I>(point: DVec2, sources: I, dt: f64, mass: f64) -> DVec2
where
    I: IntoIterator<Item = (DVec2, f64)>,
{
    let mut total = attract(DVec2::ZERO, point, SUN_MASS, dt, mass);

    for (pos, scale) in sources {
        total += attract(pos, point, scale, dt, mass);
    }

    total
}

/// Four-lane [`attract`]: one attractor acting on four points at once.
///
/// Every lane performs the same operations in the same order as the scalar
/// kernel, so lane `i` equals `attract(attractor, (px[i], py[i]), ..)`.
#[inline]
fn attract_x4(
    attractor: DVec2,
    px: f64x4,
    py: f64x4,
    attractor_scale: f64,
    dt: f64,
    mass: f64,
) -> (f64x4, f64x4) {
    let dx = f64x4::splat(attractor.x) - px;
    let dy = f64x4::splat(attractor.y) - py;
    let r_squared = dx * dx + dy * dy;

    // Near-field lanes get zero strength over a unit radius.
    let mut r2 = r_squared.to_array();
    let mut strength = [mass * attractor_scale; 4];
    for lane in 0..4 {
        if r2[lane] < NEAR_FIELD_SQ {
            r2[lane] = 1.0;
            strength[lane] = 0.0;
        }
    }

    let r2 = f64x4::new(r2);
    let factor = (f64x4::new(strength) / r2) * f64x4::splat(dt);
    let r = r2.sqrt();

    (dx / r * factor, dy / r * factor)
}

/// Four-lane [`attract_all`] for candidates stepped in lock-step.
///
/// Sources are summed in slice order, matching the scalar version.
pub fn attract_all_x4(px: f64x4, py: f64x4, sources: &[(DVec2, f64)], dt: f64, mass: f64) -> (f64x4, f64x4) {
    let (mut total_x, mut total_y) = attract_x4(DVec2::ZERO, px, py, SUN_MASS, dt, mass);

    for &(pos, scale) in sources {
        let (x, y) = attract_x4(pos, px, py, scale, dt, mass);
        total_x = total_x + x;
        total_y = total_y + y;
    }

    (total_x, total_y)
}
