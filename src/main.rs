//! Orbital Salvo - headless demo
//!
//! Spawns the default star system and lets the enemy fire control shoot at
//! the player in real time, logging every launch and impact.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use orbital_salvo::fire_control::{FireControl, FireControlPlugin};
use orbital_salvo::physics::PhysicsPlugin;
use orbital_salvo::prediction::PredictionPlugin;
use orbital_salvo::scenario::{Roster, ScenarioPlugin};
use orbital_salvo::types::{SimClock, SimulationSet, FIXED_DT, TICK_RATE_HZ};

/// Length of the demo in fixed ticks (90 seconds).
const DEMO_TICKS: u64 = 90 * 60;

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(FIXED_DT))),
            LogPlugin::default(),
        ))
        .insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ))
        .add_plugins((ScenarioPlugin, PhysicsPlugin, PredictionPlugin, FireControlPlugin))
        .add_systems(FixedUpdate, end_demo.after(SimulationSet::FireControl))
        .run();
}

fn end_demo(
    clock: Res<SimClock>,
    roster: Res<Roster>,
    control: Res<FireControl>,
    mut exit: MessageWriter<AppExit>,
) {
    let over = roster.player.is_none() || roster.all_enemies_destroyed();
    if clock.tick >= DEMO_TICKS || over {
        info!(
            "Demo finished after {:.1}s: {} rockets launched, player {}",
            clock.elapsed(),
            control.launched,
            if roster.player.is_some() { "survived" } else { "destroyed" }
        );
        exit.write(AppExit::Success);
    }
}
