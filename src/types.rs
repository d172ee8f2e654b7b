//! Core types and constants shared by the live simulation and the predictor.
//!
//! The playfield is planar. Positions are `DVec2` in world units with the Sun
//! at the origin. Angles are in degrees, measured clockwise from +y, which is
//! also the sense in which positive orbit speeds carry planets around the Sun.

use bevy::math::DVec2;
use bevy::prelude::*;

/// Fixed simulation tick (time units per step).
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Fixed update rate in Hz.
pub const TICK_RATE_HZ: f64 = 60.0;

/// Number of candidate launch angles, one per whole degree.
pub const ANGLE_COUNT: usize = 360;

/// Maximum number of steps a prediction simulates.
pub const MAX_PREDICTION_STEPS: u32 = 360;

/// Ticks between issuing a prediction and acting on it.
pub const LOOK_AHEAD_TICKS: u32 = 20;

/// Gravitational strength of the Sun.
pub const SUN_MASS: f64 = 2.0;

/// Proximity radius of the Sun used for projectile collisions.
pub const SUN_COLLISION_RADIUS: f64 = 0.41965;

/// Squared distance below which gravity is suppressed (0.4 units).
pub const NEAR_FIELD_SQ: f64 = 0.16;

/// Angle reported when no launch angle hits the target.
pub const NO_SOLUTION: i32 = -1;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// System sets ordering the fixed-update simulation.
///
/// Bodies move first, then rocket impacts are resolved, then the fire
/// control reads the settled world.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Clock, orbits and rocket flight
    Motion,
    /// Rocket hits and planet destruction
    Impacts,
    /// AI launch decisions
    FireControl,
}

/// Index of an enemy planet in the [`Roster`](crate::scenario::Roster).
pub type Slot = usize;

/// Which side a planet fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Allegiance {
    /// The player's planet, target of every enemy prediction.
    Player,
    /// An enemy planet in the given roster slot.
    Enemy(Slot),
}

/// A planet orbiting the Sun.
#[derive(Component, Clone, Debug)]
pub struct Planet {
    pub allegiance: Allegiance,
    /// Position in world units.
    pub pos: DVec2,
    /// Orbit speed around the Sun in degrees per time unit.
    pub orbit_speed: f64,
    /// Uniform scale; doubles as gravitational strength.
    pub scale: f64,
    /// Collision radius in world units (already multiplied by scale).
    pub collision_radius: f64,
    /// Hit points left.
    pub hp: f64,
}

impl Planet {
    /// Create a planet with full health.
    ///
    /// `collider_radius` is the unscaled collider radius; the effective
    /// collision radius is `scale * collider_radius`.
    pub fn new(allegiance: Allegiance, pos: DVec2, orbit_speed: f64, scale: f64, collider_radius: f64) -> Self {
        Self {
            allegiance,
            pos,
            orbit_speed,
            scale,
            collision_radius: scale * collider_radius,
            hp: 100.0,
        }
    }

    /// Roster slot for enemy planets.
    pub fn slot(&self) -> Option<Slot> {
        match self.allegiance {
            Allegiance::Enemy(slot) => Some(slot),
            Allegiance::Player => None,
        }
    }
}

/// Per-kind launch cooldowns remaining on a planet (time units).
#[derive(Component, Clone, Debug, Default)]
pub struct Cooldowns {
    remaining: [f64; 3],
}

impl Cooldowns {
    /// Cooldowns with every rocket kind ready.
    pub fn ready() -> Self {
        Self::default()
    }

    /// Start-of-game cooldowns: Thunder and Megaton begin charging.
    pub fn initial(specs: &RocketSpecs) -> Self {
        let mut cooldowns = Self::default();
        cooldowns.trigger(RocketKind::Thunder, specs);
        cooldowns.trigger(RocketKind::Megaton, specs);
        cooldowns
    }

    pub fn is_ready(&self, kind: RocketKind) -> bool {
        self.remaining[kind.index()] <= 0.0
    }

    /// Most powerful rocket kind that is off cooldown.
    pub fn best_ready(&self) -> Option<RocketKind> {
        RocketKind::ALL
            .iter()
            .rev()
            .copied()
            .find(|&kind| self.is_ready(kind))
    }

    pub fn remaining(&self, kind: RocketKind) -> f64 {
        self.remaining[kind.index()]
    }

    /// Put a rocket kind on its full cooldown.
    pub fn trigger(&mut self, kind: RocketKind, specs: &RocketSpecs) {
        self.remaining[kind.index()] = specs.get(kind).cooldown;
    }

    /// Count every cooldown down by `dt`, clamping at zero.
    pub fn tick(&mut self, dt: f64) {
        for remaining in &mut self.remaining {
            if *remaining > 0.0 {
                *remaining = (*remaining - dt).max(0.0);
            }
        }
    }
}

/// Rocket kinds, ordered from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RocketKind {
    Stinger,
    Thunder,
    Megaton,
}

impl RocketKind {
    pub const ALL: [RocketKind; 3] = [RocketKind::Stinger, RocketKind::Thunder, RocketKind::Megaton];

    fn index(self) -> usize {
        match self {
            RocketKind::Stinger => 0,
            RocketKind::Thunder => 1,
            RocketKind::Megaton => 2,
        }
    }
}

/// Parameters shared by every rocket of one kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocketSpec {
    pub damage: f64,
    /// Distance per time unit.
    pub speed: f64,
    /// Mass used for gravitational attraction.
    pub mass: f64,
    pub collision_radius: f64,
    /// Seconds between two launches of this kind from one planet.
    pub cooldown: f64,
}

/// Table of rocket specs by kind.
#[derive(Resource, Clone, Debug)]
pub struct RocketSpecs {
    pub stinger: RocketSpec,
    pub thunder: RocketSpec,
    pub megaton: RocketSpec,
}

impl RocketSpecs {
    pub fn get(&self, kind: RocketKind) -> &RocketSpec {
        match kind {
            RocketKind::Stinger => &self.stinger,
            RocketKind::Thunder => &self.thunder,
            RocketKind::Megaton => &self.megaton,
        }
    }
}

impl Default for RocketSpecs {
    fn default() -> Self {
        Self {
            stinger: RocketSpec {
                damage: 20.0,
                speed: 4.5,
                mass: 0.25,
                collision_radius: 0.05,
                cooldown: 3.0,
            },
            thunder: RocketSpec {
                damage: 35.0,
                speed: 4.0,
                mass: 0.4,
                collision_radius: 0.08,
                cooldown: 8.0,
            },
            megaton: RocketSpec {
                damage: 60.0,
                speed: 3.5,
                mass: 0.6,
                collision_radius: 0.12,
                cooldown: 20.0,
            },
        }
    }
}

/// A rocket in flight.
#[derive(Component, Clone, Debug)]
pub struct Rocket {
    pub kind: RocketKind,
    pub launched_by: Allegiance,
    pub pos: DVec2,
    /// Launch heading in degrees.
    pub angle: f64,
    /// Ticks flown so far.
    pub age: u32,
}

/// Global fixed-tick counter for the live simulation.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimClock {
    pub tick: u64,
}

impl SimClock {
    /// Elapsed time units since the clock started.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * FIXED_DT
    }
}

/// Unit heading for an angle in degrees (clockwise from +y).
#[inline]
pub fn heading(angle_deg: f64) -> DVec2 {
    let (sin, cos) = (angle_deg * DEG_TO_RAD).sin_cos();
    DVec2::new(sin, cos)
}
