//! Property-based tests for the trajectory predictor using proptest.
//!
//! These tests check the aiming invariants across many geometries.

use bevy::math::DVec2;
use proptest::prelude::*;

use super::{DirectionTable, PredictionOutcome, TrajectoryPredictor};
use crate::test_utils::fixtures;
use crate::types::{heading, FIXED_DT};

fn run(request: super::PredictionRequest) -> PredictionOutcome {
    TrajectoryPredictor::new(request, DirectionTable::new(FIXED_DT)).run()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Without gravity a still target on one heading is hit by exactly that
    /// heading, at step ceil(distance / (speed * dt)).
    #[test]
    fn prop_straight_shot_step_count(
        angle in 0u16..360,
        whole_steps in 60u32..300,
        frac in 0.7f64..0.95,
        origin_angle in 0.0f64..360.0,
    ) {
        // Far enough out that no candidate can reach the Sun.
        let origin = heading(origin_angle) * 8.0;
        let distance = (whole_steps as f64 + frac) * FIXED_DT;
        let request = fixtures::straight_shot(origin, angle as f64, distance);

        let expected_step = (distance / FIXED_DT).ceil() as u32;
        prop_assert_eq!(run(request), PredictionOutcome::Hit { angle, step: expected_step });
    }

    /// Identical snapshots give identical outcomes.
    #[test]
    fn prop_prediction_is_deterministic(
        target_angle in 0.0f64..360.0,
        obstacle_phase in 0.0f64..360.0,
        mass in 0.0f64..3.0,
    ) {
        let first = run(fixtures::busy_system(target_angle, obstacle_phase, mass));
        let second = run(fixtures::busy_system(target_angle, obstacle_phase, mass));
        prop_assert_eq!(first, second);
    }

    /// The shooter's own radius never costs a candidate.
    #[test]
    fn prop_shooter_is_never_an_obstacle(
        angle in 0u16..360,
        shooter_radius in 0.0f64..3.0,
    ) {
        let origin = DVec2::new(0.0, -9.0);
        let mut request = fixtures::straight_shot(origin, angle as f64, 2.515);
        if let Some(shooter) = request.bodies[0].as_mut() {
            shooter.collision_radius = shooter_radius;
        }

        prop_assert_eq!(run(request), PredictionOutcome::Hit { angle, step: 151 });
    }

    /// A candidate blocked before the target can never be the winner.
    #[test]
    fn prop_blocked_candidate_never_wins(
        angle in 0u16..360,
        fraction in 0.2f64..0.8,
        obstacle_radius in 0.05f64..0.3,
    ) {
        let origin = DVec2::new(-9.0, 0.0);
        let distance = 2.515;
        let mut request = fixtures::straight_shot(origin, angle as f64, distance);
        let blocker = origin + heading(angle as f64) * (distance * fraction);
        request.bodies.push(Some(fixtures::still_body(blocker, 0.0, obstacle_radius)));

        let outcome = run(request);
        prop_assert_ne!(outcome.angle(), Some(angle));
    }
}
