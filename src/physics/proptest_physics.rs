//! Property-based tests for the gravity and orbit kernels using proptest.
//!
//! These tests verify the kernel invariants across a wide range of positions.

use bevy::math::DVec2;
use proptest::prelude::*;
use wide::f64x4;

use super::{attract, step_projectile, step_projectiles_x4, FixedRotation};
use crate::test_utils::assertions;
use crate::types::{heading, FIXED_DT, NEAR_FIELD_SQ};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Outside the near field, attraction points at the attractor with
    /// magnitude mass * scale / r² * dt.
    #[test]
    fn prop_attraction_follows_inverse_square(
        angle in 0.0f64..360.0,
        distance in 0.41f64..20.0,
        scale in 0.1f64..3.0,
        mass in 0.1f64..3.0,
    ) {
        let attractor = DVec2::new(1.0, -2.0);
        let point = attractor + heading(angle) * distance;

        let disp = attract(attractor, point, scale, FIXED_DT, mass);
        let expected = mass * scale / (distance * distance) * FIXED_DT;

        prop_assert!((disp.length() - expected).abs() <= expected * 1e-9);
        // Direction is toward the attractor.
        prop_assert!(disp.dot(attractor - point) > 0.0);
    }

    /// Inside the near field, attraction vanishes whatever the strength.
    #[test]
    fn prop_near_field_is_silent(
        angle in 0.0f64..360.0,
        fraction in 0.0f64..0.999,
        scale in 0.0f64..1000.0,
    ) {
        let attractor = DVec2::new(-3.0, 4.0);
        let point = attractor + heading(angle) * (NEAR_FIELD_SQ.sqrt() * fraction);

        prop_assert_eq!(attract(attractor, point, scale, FIXED_DT, 1.0), DVec2::ZERO);
    }

    /// Applying the per-step rotation n times matches the n-step rotation.
    #[test]
    fn prop_rotation_composes(
        orbit_speed in -60.0f64..60.0,
        steps in 1u32..400,
        start_angle in 0.0f64..360.0,
        radius in 1.0f64..10.0,
    ) {
        let start = heading(start_angle) * radius;
        let per_step = FixedRotation::per_step(orbit_speed, FIXED_DT);

        let mut pos = start;
        for _ in 0..steps {
            pos = per_step.apply(pos);
        }

        let direct = FixedRotation::from_degrees(orbit_speed * FIXED_DT * f64::from(steps)).apply(start);
        assertions::assert_near(pos, direct, 1e-9);
        prop_assert!((pos.length() - radius).abs() < 1e-9);
    }

    /// A massless projectile moves exactly shift * speed each step.
    #[test]
    fn prop_massless_projectile_moves_straight(
        angle in 0.0f64..360.0,
        speed in 0.5f64..5.0,
        x in -5.0f64..5.0,
        y in -5.0f64..5.0,
    ) {
        let pos = DVec2::new(x, y);
        let shift = heading(angle) * FIXED_DT;
        let sources = [(DVec2::new(2.0, 2.0), 1.0), (DVec2::new(-1.0, 3.0), 0.5)];

        let next = step_projectile(pos, shift, speed, 0.0, FIXED_DT, sources);
        assertions::assert_near(next, pos + shift * speed, 1e-12);
    }

    /// The four-lane step reproduces the scalar step exactly, lane by lane,
    /// so predictions and live rockets follow identical paths.
    #[test]
    fn prop_batched_step_matches_scalar(
        xs in prop::array::uniform4(-8.0f64..8.0),
        ys in prop::array::uniform4(-8.0f64..8.0),
        angles in prop::array::uniform4(0u16..360),
        speed in 0.5f64..5.0,
        mass in 0.0f64..2.0,
    ) {
        let sources = [(DVec2::new(4.5, 0.0), 0.6), (DVec2::new(-3.0, -3.0), 0.3), (DVec2::new(0.0, 7.0), 0.7)];
        let shifts = angles.map(|a| heading(f64::from(a)) * FIXED_DT);

        let (bx, by) = step_projectiles_x4(
            f64x4::new(xs),
            f64x4::new(ys),
            f64x4::new(shifts.map(|s| s.x)),
            f64x4::new(shifts.map(|s| s.y)),
            speed,
            mass,
            FIXED_DT,
            &sources,
        );
        let (bx, by) = (bx.to_array(), by.to_array());

        for lane in 0..4 {
            let scalar = step_projectile(DVec2::new(xs[lane], ys[lane]), shifts[lane], speed, mass, FIXED_DT, sources);
            prop_assert_eq!(bx[lane], scalar.x);
            prop_assert_eq!(by[lane], scalar.y);
        }
    }
}
