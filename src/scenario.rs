//! Star system layout and the roster of planets.
//!
//! Planets sit on five orbital lanes between a minimum and maximum distance
//! from the Sun. The player takes one lane and the enemies fill the others.
//! Outer lanes orbit more slowly.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::types::{heading, Allegiance, Cooldowns, Planet, RocketSpecs, Slot};

/// Number of orbital lanes.
pub const LANE_COUNT: usize = 5;

/// Plugin that spawns the configured star system at startup.
pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScenarioSettings>()
            .init_resource::<Roster>()
            .init_resource::<RocketSpecs>()
            .add_systems(Startup, spawn_star_system);
    }
}

/// Layout parameters for the star system.
#[derive(Resource, Clone, Debug)]
pub struct ScenarioSettings {
    /// Distance of the innermost lane from the Sun.
    pub distance_min: f64,
    /// Distance of the outermost lane from the Sun.
    pub distance_max: f64,
    pub scale_min: f64,
    pub scale_max: f64,
    /// Orbit speed of lanes 0 and 1 (degrees per time unit); lane `n > 1`
    /// orbits at this speed divided by `n`.
    pub orbit_speed: f64,
    /// Unscaled collider radius of every planet.
    pub collider_radius: f64,
    /// Lane taken by the player.
    pub player_lane: usize,
    /// Number of enemy planets (at most four).
    pub enemy_count: usize,
    /// Angle of the player on its lane, in degrees.
    pub player_phase: f64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            distance_min: 1.5,
            distance_max: 7.5,
            scale_min: 0.25,
            scale_max: 0.7,
            orbit_speed: 12.0,
            collider_radius: 0.5,
            player_lane: 2,
            enemy_count: 4,
            player_phase: 0.0,
        }
    }
}

impl ScenarioSettings {
    /// Distance of `lane` from the Sun.
    pub fn lane_distance(&self, lane: usize) -> f64 {
        let t = lane.min(LANE_COUNT - 1) as f64 / (LANE_COUNT - 1) as f64;
        self.distance_min + (self.distance_max - self.distance_min) * t
    }

    /// Orbit speed on `lane`.
    pub fn lane_speed(&self, lane: usize) -> f64 {
        self.orbit_speed / lane.max(1) as f64
    }

    /// Lanes left for enemies, in order, after the player's lane.
    pub fn enemy_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..LANE_COUNT)
            .filter(move |&lane| lane != self.player_lane)
            .take(self.enemy_count)
    }

    /// Planet for `allegiance` on `lane`, placed `index` fifths around the orbit.
    pub fn planet(&self, allegiance: Allegiance, lane: usize, index: usize) -> Planet {
        let phase = self.player_phase + index as f64 * (360.0 / LANE_COUNT as f64);
        let t = index as f64 / (LANE_COUNT - 1) as f64;
        let scale = self.scale_min + (self.scale_max - self.scale_min) * t;

        Planet::new(
            allegiance,
            heading(phase) * self.lane_distance(lane),
            self.lane_speed(lane),
            scale,
            self.collider_radius,
        )
    }
}

/// Which entity occupies each planet role.
///
/// Enemy slots stay in place when a planet is destroyed; the slot just
/// becomes `None`, so slot numbers remain stable for the whole game.
#[derive(Resource, Clone, Debug, Default)]
pub struct Roster {
    pub player: Option<Entity>,
    pub enemies: Vec<Option<Entity>>,
}

impl Roster {
    pub fn enemy(&self, slot: Slot) -> Option<Entity> {
        self.enemies.get(slot).copied().flatten()
    }

    /// Occupied enemy slots in ascending order.
    pub fn live_enemies(&self) -> impl Iterator<Item = (Slot, Entity)> + '_ {
        self.enemies
            .iter()
            .enumerate()
            .filter_map(|(slot, entity)| entity.map(|e| (slot, e)))
    }

    /// Put `entity` into enemy `slot`, growing the slot list as needed.
    pub fn set_enemy(&mut self, slot: Slot, entity: Entity) {
        if self.enemies.len() <= slot {
            self.enemies.resize(slot + 1, None);
        }
        self.enemies[slot] = Some(entity);
    }

    /// Clear whichever role `entity` held. Returns that role.
    pub fn remove(&mut self, entity: Entity) -> Option<Allegiance> {
        if self.player == Some(entity) {
            self.player = None;
            return Some(Allegiance::Player);
        }
        let slot = self.enemies.iter().position(|e| *e == Some(entity))?;
        self.enemies[slot] = None;
        Some(Allegiance::Enemy(slot))
    }

    pub fn all_enemies_destroyed(&self) -> bool {
        self.live_enemies().next().is_none()
    }
}

/// Spawn the player and enemy planets described by [`ScenarioSettings`].
pub fn spawn_star_system(
    mut commands: Commands,
    settings: Res<ScenarioSettings>,
    specs: Res<RocketSpecs>,
    mut roster: ResMut<Roster>,
) {
    let player = settings.planet(Allegiance::Player, settings.player_lane, 0);
    roster.player = Some(commands.spawn((player, Cooldowns::initial(&specs))).id());

    for (slot, lane) in settings.enemy_lanes().enumerate() {
        let planet = settings.planet(Allegiance::Enemy(slot), lane, slot + 1);
        let entity = commands.spawn((planet, Cooldowns::initial(&specs))).id();
        roster.set_enemy(slot, entity);
    }

    info!(
        "Star system ready: player on lane {}, {} enemies",
        settings.player_lane,
        roster.enemies.len()
    );
}
