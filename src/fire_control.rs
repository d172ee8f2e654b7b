//! Enemy fire control.
//!
//! Decides when an enemy planet launches, which planet and which rocket kind,
//! and turns finished predictions into rockets. Launches speed up as the game
//! goes on. Only one shot is being aimed at any time.
//!
//! A prediction describes the world at its ready tick and nowhere else. A
//! result that is not in by then is thrown away and the shot re-aimed.

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::prediction::{LiveBody, PredictionBoard, PredictionOutcome, PredictionScheduler, ProjectileSpec};
use crate::scenario::Roster;
use crate::types::{
    Allegiance, Cooldowns, Planet, Rocket, RocketKind, RocketSpecs, SimClock, SimulationSet, Slot, FIXED_DT,
};

/// Plugin providing the enemy launch cadence.
pub struct FireControlPlugin;

impl Plugin for FireControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FireControlConfig>();

        let config = app.world().resource::<FireControlConfig>().clone();
        app.insert_resource(FireControl::new(&config)).add_systems(
            FixedUpdate,
            (tick_cooldowns, run_fire_control)
                .chain()
                .in_set(SimulationSet::FireControl),
        );
    }
}

/// Tuning for the enemy launch cadence.
#[derive(Resource, Clone, Debug)]
pub struct FireControlConfig {
    /// Time of the first launch attempt.
    pub first_launch_at: f64,
    /// `(elapsed, delay)` pairs sorted by `elapsed`: once `elapsed` time has
    /// passed, launches are `delay` apart.
    pub cadence: Vec<(f64, f64)>,
    /// Wait before trying again when no enemy has a rocket ready.
    pub idle_retry: f64,
}

impl Default for FireControlConfig {
    fn default() -> Self {
        Self {
            first_launch_at: 3.0,
            cadence: vec![(0.0, 6.0), (20.0, 4.0), (40.0, 2.0), (60.0, 1.0)],
            idle_retry: 1.0,
        }
    }
}

impl FireControlConfig {
    /// Delay between launches at `elapsed` time.
    pub fn launch_delay(&self, elapsed: f64) -> f64 {
        self.cadence
            .iter()
            .take_while(|(since, _)| *since <= elapsed)
            .last()
            .or_else(|| self.cadence.first())
            .map_or(self.idle_retry, |(_, delay)| *delay)
    }
}

/// A shot whose prediction is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingShot {
    pub shooter: Slot,
    pub kind: RocketKind,
    /// Board generation the shot belongs to.
    pub generation: u64,
}

/// Fire control state.
///
/// `next_launch_at` is counted from the tick a shot is aimed, so the
/// look-ahead overlaps the launch delay.
#[derive(Resource, Clone, Debug)]
pub struct FireControl {
    /// Elapsed time of the next launch attempt.
    pub next_launch_at: f64,
    pub pending: Option<PendingShot>,
    /// Slot to start the next round-robin search from.
    cursor: Slot,
    /// Rockets launched so far.
    pub launched: u32,
}

impl FireControl {
    pub fn new(config: &FireControlConfig) -> Self {
        Self {
            next_launch_at: config.first_launch_at,
            pending: None,
            cursor: 0,
            launched: 0,
        }
    }
}

/// Search `slot_count` slots round-robin from `cursor` for a shooter.
///
/// `ready_kind` returns the rocket kind a slot would fire, or `None` if the
/// slot is empty or has nothing off cooldown.
pub fn pick_shooter(
    cursor: Slot,
    slot_count: usize,
    ready_kind: impl Fn(Slot) -> Option<RocketKind>,
) -> Option<(Slot, RocketKind)> {
    (0..slot_count)
        .map(|offset| (cursor + offset) % slot_count)
        .find_map(|slot| ready_kind(slot).map(|kind| (slot, kind)))
}

/// Spawn a rocket launched by enemy `shooter`.
pub fn launch_rocket(commands: &mut Commands, shooter: Slot, pos: DVec2, kind: RocketKind, angle: u16) -> Entity {
    commands
        .spawn(Rocket {
            kind,
            launched_by: Allegiance::Enemy(shooter),
            pos,
            angle: f64::from(angle),
            age: 0,
        })
        .id()
}

fn tick_cooldowns(mut cooldowns: Query<&mut Cooldowns>) {
    for mut cooldowns in cooldowns.iter_mut() {
        cooldowns.tick(FIXED_DT);
    }
}

/// Resolve the pending shot, then schedule a new one when a launch is due.
#[allow(clippy::too_many_arguments)]
pub fn run_fire_control(
    mut commands: Commands,
    clock: Res<SimClock>,
    config: Res<FireControlConfig>,
    specs: Res<RocketSpecs>,
    scheduler: Res<PredictionScheduler>,
    roster: Res<Roster>,
    mut board: ResMut<PredictionBoard>,
    mut control: ResMut<FireControl>,
    mut planets: Query<(&Planet, &mut Cooldowns)>,
) {
    let elapsed = clock.elapsed();
    let player = roster
        .player
        .and_then(|entity| planets.get(entity).ok())
        .map(|(planet, _)| LiveBody::from(planet));

    if let Some(shot) = control.pending {
        let shooter = roster.enemy(shot.shooter);

        if player.is_none() {
            board.cancel_all();
            control.pending = None;
            control.next_launch_at = elapsed;
            info!("Dropped all predictions: target gone");
        } else if shooter.is_none() {
            board.cancel(shot.shooter);
            control.pending = None;
            control.next_launch_at = elapsed;
            info!("Dropped prediction for shooter {}: planet gone", shot.shooter);
        } else if board.get(shot.shooter).map(|h| h.generation()) != Some(shot.generation) {
            // Superseded outside fire control.
            control.pending = None;
            control.next_launch_at = elapsed;
            debug!("Prediction for shooter {} superseded, re-aiming", shot.shooter);
        } else {
            let Some(handle) = board.get_mut(shot.shooter) else {
                return;
            };
            if !handle.is_due(clock.tick) {
                return;
            }

            let overdue = handle.overdue_by(clock.tick);
            let outcome = if overdue == 0 { handle.poll() } else { None };

            match outcome {
                None => {
                    warn!(
                        "Prediction for shooter {} missed its ready tick {} (now {}), re-aiming",
                        shot.shooter,
                        clock.tick - overdue,
                        clock.tick
                    );
                    board.cancel(shot.shooter);
                    control.pending = None;
                    control.next_launch_at = elapsed;
                }
                Some(PredictionOutcome::Hit { angle, step }) => {
                    board.take(shot.shooter);
                    control.pending = None;

                    if let Some((planet, mut cooldowns)) = shooter.and_then(|entity| planets.get_mut(entity).ok()) {
                        launch_rocket(&mut commands, shot.shooter, planet.pos, shot.kind, angle);
                        cooldowns.trigger(shot.kind, &specs);
                        control.launched += 1;
                        info!(
                            "Shooter {} launched {:?} at {} degrees, impact expected in {} ticks",
                            shot.shooter, shot.kind, angle, step
                        );
                    }
                }
                Some(PredictionOutcome::NoSolution(reason)) => {
                    board.take(shot.shooter);
                    control.pending = None;
                    control.next_launch_at = elapsed;
                    debug!("No firing solution for shooter {} ({:?}), retrying", shot.shooter, reason);
                }
            }
        }
    }

    if control.pending.is_some() || elapsed < control.next_launch_at || player.is_none() {
        return;
    }

    let picked = pick_shooter(control.cursor, roster.enemies.len(), |slot| {
        let entity = roster.enemy(slot)?;
        let (_, cooldowns) = planets.get(entity).ok()?;
        cooldowns.best_ready()
    });

    let Some((shooter, kind)) = picked else {
        control.next_launch_at = elapsed + config.idle_retry;
        debug!("No enemy ready to fire, retrying in {:.1}", config.idle_retry);
        return;
    };

    let bodies: Vec<Option<LiveBody>> = roster
        .enemies
        .iter()
        .map(|&slot| {
            slot.and_then(|entity| planets.get(entity).ok())
                .map(|(planet, _)| LiveBody::from(planet))
        })
        .collect();

    let projectile = ProjectileSpec::from(specs.get(kind));
    match board.submit(&scheduler, player.as_ref(), &bodies, shooter, projectile, clock.tick) {
        Ok(generation) => {
            control.pending = Some(PendingShot {
                shooter,
                kind,
                generation,
            });
            control.cursor = shooter + 1;
            control.next_launch_at = elapsed + config.launch_delay(elapsed);
            debug!("Aiming {:?} from shooter {} (generation {})", kind, shooter, generation);
        }
        Err(err) => {
            warn!("Cannot aim from shooter {}: {}", shooter, err);
            control.next_launch_at = elapsed + config.idle_retry;
        }
    }
}
