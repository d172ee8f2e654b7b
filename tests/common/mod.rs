//! Common test utilities for integration tests.

use std::time::Duration;

use bevy::math::DVec2;
use bevy::prelude::*;
use orbital_salvo::fire_control::FireControl;
use orbital_salvo::physics::PhysicsPlugin;
use orbital_salvo::prediction::{LiveBody, PredictionBoard, PredictionPlugin};
use orbital_salvo::scenario::Roster;
use orbital_salvo::types::{Allegiance, Cooldowns, Planet};

/// Headless app with the live simulation and the prediction scheduler.
pub fn simulation_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((PhysicsPlugin, PredictionPlugin));
    app
}

/// Run `ticks` fixed simulation steps.
pub fn run_ticks(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Block until fire control's pending prediction, if any, has finished.
pub fn settle_prediction(app: &App) {
    let Some(shot) = app.world().resource::<FireControl>().pending else {
        return;
    };
    let board = app.world().resource::<PredictionBoard>();
    while board.get(shot.shooter).is_some_and(|handle| !handle.is_finished()) {
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Run `ticks` fixed steps, letting each pending prediction finish first.
pub fn run_settled_ticks(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        settle_prediction(app);
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Spawn a planet and register it in the roster.
pub fn spawn_planet(app: &mut App, planet: Planet) -> Entity {
    let allegiance = planet.allegiance;
    let entity = app.world_mut().spawn((planet, Cooldowns::ready())).id();

    let mut roster = app.world_mut().resource_mut::<Roster>();
    match allegiance {
        Allegiance::Player => roster.player = Some(entity),
        Allegiance::Enemy(slot) => roster.set_enemy(slot, entity),
    }
    entity
}

/// A planet with scale 0.5 and collision radius 0.25.
pub fn planet(allegiance: Allegiance, pos: DVec2, orbit_speed: f64) -> Planet {
    Planet::new(allegiance, pos, orbit_speed, 0.5, 0.5)
}

/// Live view of a spawned planet.
pub fn live_body(app: &App, entity: Entity) -> Option<LiveBody> {
    app.world().get::<Planet>(entity).map(LiveBody::from)
}

/// Distance between two points.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (a - b).length()
}
