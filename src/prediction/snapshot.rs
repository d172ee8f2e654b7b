//! Frozen world snapshots handed to the trajectory predictor.
//!
//! Everything here is a value copy. A request never refers back to live
//! entities, so a running prediction cannot observe the main loop mutating
//! the world.

use bevy::math::DVec2;

use super::scheduler::PredictionError;
use super::PredictionConfig;
use crate::physics::FixedRotation;
use crate::types::{Planet, RocketSpec, Slot};

/// Current state of a body in the live world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveBody {
    pub pos: DVec2,
    pub scale: f64,
    pub collision_radius: f64,
    /// Degrees per time unit around the origin.
    pub orbit_speed: f64,
}

impl From<&Planet> for LiveBody {
    fn from(planet: &Planet) -> Self {
        Self {
            pos: planet.pos,
            scale: planet.scale,
            collision_radius: planet.collision_radius,
            orbit_speed: planet.orbit_speed,
        }
    }
}

/// A body projected into the future, with its per-step rotation baked in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySnapshot {
    pub pos: DVec2,
    pub scale: f64,
    pub collision_radius: f64,
    pub rotation: FixedRotation,
}

impl BodySnapshot {
    /// Project `body` forward by `ticks` steps of size `dt`.
    ///
    /// Steps one rotation at a time, as the live orbits do, so the projected
    /// position matches the live one at the ready tick exactly.
    pub fn project(body: &LiveBody, dt: f64, ticks: u32) -> Self {
        let mut snapshot = Self {
            pos: body.pos,
            scale: body.scale,
            collision_radius: body.collision_radius,
            rotation: FixedRotation::per_step(body.orbit_speed, dt),
        };
        for _ in 0..ticks {
            snapshot.advance();
        }
        snapshot
    }

    /// Advance one step along the orbit.
    #[inline]
    pub fn advance(&mut self) {
        self.pos = self.rotation.apply(self.pos);
    }
}

/// Projectile parameters shared by all 360 candidates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSpec {
    pub collision_radius: f64,
    pub mass: f64,
    pub speed: f64,
}

impl ProjectileSpec {
    pub fn validate(&self) -> Result<(), PredictionError> {
        if !(self.collision_radius.is_finite() && self.mass.is_finite() && self.speed.is_finite()) {
            return Err(PredictionError::InvalidProjectile("parameters must be finite"));
        }
        if self.speed <= 0.0 {
            return Err(PredictionError::InvalidProjectile("speed must be positive"));
        }
        if self.collision_radius < 0.0 {
            return Err(PredictionError::InvalidProjectile("collision radius must not be negative"));
        }
        if self.mass < 0.0 {
            return Err(PredictionError::InvalidProjectile("mass must not be negative"));
        }
        Ok(())
    }
}

impl From<&RocketSpec> for ProjectileSpec {
    fn from(spec: &RocketSpec) -> Self {
        Self {
            collision_radius: spec.collision_radius,
            mass: spec.mass,
            speed: spec.speed,
        }
    }
}

/// Everything a trajectory prediction needs, frozen at `look_ahead` ticks ahead.
#[derive(Clone, Debug)]
pub struct PredictionRequest {
    /// The body the candidates are aiming for.
    pub target: BodySnapshot,
    /// Other bodies by slot; `None` slots are ignored entirely.
    pub bodies: Vec<Option<BodySnapshot>>,
    /// Slot excluded from collision checks.
    pub shooter: Slot,
    /// Launch point shared by all candidates (the shooter's projected position).
    pub origin: DVec2,
    pub projectile: ProjectileSpec,
    /// Step budget.
    pub max_steps: u32,
}

impl PredictionRequest {
    /// Capture a request from the live world.
    ///
    /// Fails if the target is absent, the shooter slot is empty, or the
    /// projectile parameters are unusable.
    pub fn capture(
        target: Option<&LiveBody>,
        bodies: &[Option<LiveBody>],
        shooter: Slot,
        projectile: ProjectileSpec,
        config: &PredictionConfig,
    ) -> Result<Self, PredictionError> {
        projectile.validate()?;

        let target = target.ok_or(PredictionError::TargetMissing)?;
        let project = |body: &LiveBody| BodySnapshot::project(body, config.dt, config.look_ahead_ticks);

        let bodies: Vec<Option<BodySnapshot>> = bodies.iter().map(|b| b.as_ref().map(project)).collect();

        let origin = bodies
            .get(shooter)
            .copied()
            .flatten()
            .map(|b| b.pos)
            .ok_or(PredictionError::ShooterMissing(shooter))?;

        Ok(Self {
            target: project(target),
            bodies,
            shooter,
            origin,
            projectile,
            max_steps: config.max_steps,
        })
    }

    /// Number of body slots that hold a live body.
    pub fn live_bodies(&self) -> usize {
        self.bodies.iter().flatten().count()
    }
}
