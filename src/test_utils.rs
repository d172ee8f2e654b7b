//! Test utilities for prediction and live-simulation tests.
//!
//! Provides fixtures for building snapshots and live bodies, plus
//! assertions for comparing outcomes.

use bevy::math::DVec2;

use crate::physics::FixedRotation;
use crate::prediction::{BodySnapshot, LiveBody, PredictionRequest, ProjectileSpec};
use crate::types::{heading, MAX_PREDICTION_STEPS};

/// Fixtures for creating test bodies and requests.
pub mod fixtures {
    use super::*;

    /// A stationary body snapshot.
    pub fn still_body(pos: DVec2, scale: f64, collision_radius: f64) -> BodySnapshot {
        BodySnapshot {
            pos,
            scale,
            collision_radius,
            rotation: FixedRotation::IDENTITY,
        }
    }

    /// A live body with no gravity.
    pub fn live_body(pos: DVec2, orbit_speed: f64, collision_radius: f64) -> LiveBody {
        LiveBody {
            pos,
            scale: 0.0,
            collision_radius,
            orbit_speed,
        }
    }

    /// Projectile that feels no gravity and travels one unit per time unit.
    pub fn massless_projectile() -> ProjectileSpec {
        ProjectileSpec {
            collision_radius: 0.0,
            mass: 0.0,
            speed: 1.0,
        }
    }

    /// Gravity-free request with a still target `distance` away along `angle_deg`.
    ///
    /// The shooter sits in slot 0 at `origin`; the target has a 0.01 reach.
    pub fn straight_shot(origin: DVec2, angle_deg: f64, distance: f64) -> PredictionRequest {
        PredictionRequest {
            target: still_body(origin + heading(angle_deg) * distance, 0.0, 0.01),
            bodies: vec![Some(still_body(origin, 0.0, 0.2))],
            shooter: 0,
            origin,
            projectile: massless_projectile(),
            max_steps: MAX_PREDICTION_STEPS,
        }
    }

    /// A crowded system with real gravity: the shooter, a target and three
    /// orbiting obstacles.
    pub fn busy_system(target_angle: f64, obstacle_phase: f64, projectile_mass: f64) -> PredictionRequest {
        let orbit = |radius: f64, angle: f64, speed: f64, scale: f64| BodySnapshot {
            pos: heading(angle) * radius,
            scale,
            collision_radius: scale * 0.5,
            rotation: FixedRotation::per_step(speed, crate::types::FIXED_DT),
        };

        let shooter = orbit(3.0, 90.0, 20.0, 0.8);
        let bodies = vec![
            Some(shooter),
            Some(orbit(4.5, obstacle_phase, 12.0, 1.0)),
            None,
            Some(orbit(6.0, obstacle_phase + 120.0, 8.0, 0.6)),
            Some(orbit(7.5, obstacle_phase + 240.0, 5.0, 1.2)),
        ];

        PredictionRequest {
            target: orbit(5.25, target_angle, 10.0, 0.9),
            bodies,
            shooter: 0,
            origin: shooter.pos,
            projectile: ProjectileSpec {
                collision_radius: 0.1,
                mass: projectile_mass,
                speed: 3.0,
            },
            max_steps: MAX_PREDICTION_STEPS,
        }
    }
}

/// Assertions for comparing geometry.
pub mod assertions {
    use super::*;

    /// Assert two points are within `epsilon` of each other.
    pub fn assert_near(actual: DVec2, expected: DVec2, epsilon: f64) {
        let distance = (actual - expected).length();
        assert!(
            distance <= epsilon,
            "Expected {:?} within {} of {:?} (distance {})",
            actual,
            epsilon,
            expected,
            distance
        );
    }
}
