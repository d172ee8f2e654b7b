//! Live simulation of orbiting planets and rockets in flight.
//!
//! Runs in Bevy's FixedUpdate schedule, one tick per [`PredictionConfig::dt`].
//! Rockets use the same step kernel, step size, source order and fuel budget
//! as the trajectory predictor, so a rocket fired at a predicted angle
//! retraces the predicted path.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use bevy::math::DVec2;
use bevy::prelude::*;

pub use gravity::{attract, attract_all, attract_all_x4};
pub use integrator::{overlaps, step_projectile, step_projectiles_x4, FixedRotation};

use crate::prediction::PredictionConfig;
use crate::scenario::Roster;
use crate::types::{heading, Allegiance, Planet, Rocket, RocketSpecs, SimClock, SimulationSet, SUN_COLLISION_RADIUS};

/// Plugin providing the live simulation.
///
/// Adds systems for:
/// - Clock and orbital motion
/// - Rocket flight under gravity
/// - Rocket impacts and planet destruction
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .init_resource::<Roster>()
            .init_resource::<RocketSpecs>()
            .init_resource::<PredictionConfig>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Motion,
                    SimulationSet::Impacts,
                    SimulationSet::FireControl,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                (advance_clock, advance_orbits, fly_rockets)
                    .chain()
                    .in_set(SimulationSet::Motion),
            )
            .add_systems(FixedUpdate, resolve_rocket_impacts.in_set(SimulationSet::Impacts));
    }
}

fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick += 1;
}

/// Carry every planet one fixed step around the Sun.
pub fn advance_orbits(mut planets: Query<&mut Planet>, config: Res<PredictionConfig>) {
    for mut planet in planets.iter_mut() {
        let rotation = FixedRotation::per_step(planet.orbit_speed, config.dt);
        planet.pos = rotation.apply(planet.pos);
    }
}

/// Move every rocket one step along its heading and apply gravity.
///
/// Gravity is summed player first, then enemies in slot order.
pub fn fly_rockets(
    mut rockets: Query<&mut Rocket>,
    planets: Query<&Planet>,
    roster: Res<Roster>,
    specs: Res<RocketSpecs>,
    config: Res<PredictionConfig>,
) {
    let sources: Vec<(DVec2, f64)> = roster
        .player
        .into_iter()
        .chain(roster.enemies.iter().flatten().copied())
        .filter_map(|entity| planets.get(entity).ok())
        .map(|planet| (planet.pos, planet.scale))
        .collect();

    for mut rocket in rockets.iter_mut() {
        let spec = specs.get(rocket.kind);
        let shift = heading(rocket.angle) * config.dt;
        rocket.pos = step_projectile(
            rocket.pos,
            shift,
            spec.speed,
            spec.mass,
            config.dt,
            sources.iter().copied(),
        );
        rocket.age += 1;
    }
}

/// Resolve rockets touching the Sun or a planet.
///
/// A rocket never hits the planet that launched it. A planet whose hit
/// points drop to zero is despawned and its roster slot cleared.
pub fn resolve_rocket_impacts(
    mut commands: Commands,
    rockets: Query<(Entity, &Rocket)>,
    mut planets: Query<(Entity, &mut Planet)>,
    specs: Res<RocketSpecs>,
    config: Res<PredictionConfig>,
    mut roster: ResMut<Roster>,
) {
    let mut destroyed: Vec<Entity> = Vec::new();

    for (rocket_entity, rocket) in rockets.iter() {
        let spec = specs.get(rocket.kind);

        // Burned up in the Sun or flew past its fuel budget.
        if rocket.age > config.max_steps
            || overlaps(rocket.pos, DVec2::ZERO, spec.collision_radius + SUN_COLLISION_RADIUS)
        {
            commands.entity(rocket_entity).despawn();
            continue;
        }

        let hit = planets.iter_mut().find(|(entity, planet)| {
            !destroyed.contains(entity)
                && planet.allegiance != rocket.launched_by
                && overlaps(rocket.pos, planet.pos, spec.collision_radius + planet.collision_radius)
        });

        let Some((planet_entity, mut planet)) = hit else {
            continue;
        };

        planet.hp -= spec.damage;
        commands.entity(rocket_entity).despawn();

        if planet.hp > 0.0 {
            debug!(
                "{:?} rocket hit {:?}, {:.0} hp left",
                rocket.kind, planet.allegiance, planet.hp
            );
            continue;
        }

        destroyed.push(planet_entity);
        commands.entity(planet_entity).despawn();
        roster.remove(planet_entity);

        match planet.allegiance {
            Allegiance::Player => info!("Player planet destroyed"),
            Allegiance::Enemy(slot) => {
                info!("Enemy planet {} destroyed", slot);
                if roster.all_enemies_destroyed() {
                    info!("All enemy planets destroyed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioSettings;
    use crate::types::{RocketKind, FIXED_DT, NEAR_FIELD_SQ};

    #[test]
    fn test_rockets_outrun_launcher_gravity() {
        // Gravity switches on at the near-field edge, still inside most
        // planets' colliders; every rocket must be able to climb out.
        let specs = RocketSpecs::default();
        let scale = ScenarioSettings::default().scale_max;
        let edge = DVec2::new(NEAR_FIELD_SQ.sqrt(), 0.0);

        for kind in RocketKind::ALL {
            let spec = specs.get(kind);
            let pull = attract(DVec2::ZERO, edge, scale, FIXED_DT, spec.mass).length();
            assert!(
                spec.speed * FIXED_DT > pull,
                "{:?} moves {} per step but is pulled back {}",
                kind,
                spec.speed * FIXED_DT,
                pull
            );
        }
    }

    #[test]
    fn test_advance_orbits_rotates_planets() {
        let mut world = World::new();
        world.insert_resource(PredictionConfig::default());
        let entity = world
            .spawn(Planet::new(Allegiance::Player, DVec2::new(0.0, 3.0), 60.0, 0.5, 0.5))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_orbits);
        schedule.run(&mut world);

        // 60 degrees per unit at 60 Hz is one degree per tick, clockwise.
        let pos = world.get::<Planet>(entity).map(|p| p.pos).unwrap_or_default();
        let expected = heading(1.0) * 3.0;
        assert!((pos - expected).length() < 1e-12);
    }
}
