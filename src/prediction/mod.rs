//! Predictive aiming.
//!
//! Finds the launch angle that lands a rocket on a moving planet by
//! simulating all 360 whole-degree launch angles at once in a frozen copy of
//! the future world. The work runs on Bevy's async compute pool so the fixed
//! update loop never waits for it.

mod directions;
mod predictor;
mod scheduler;
mod snapshot;

#[cfg(test)]
mod proptest_prediction;

use bevy::prelude::*;

pub use directions::DirectionTable;
pub use predictor::{NoSolutionReason, PredictionOutcome, StepOutcome, TrajectoryPredictor};
pub use scheduler::{CancelToken, PredictionBoard, PredictionError, PredictionHandle, PredictionScheduler};
pub use snapshot::{BodySnapshot, LiveBody, PredictionRequest, ProjectileSpec};

use crate::types::{FIXED_DT, LOOK_AHEAD_TICKS, MAX_PREDICTION_STEPS};

/// Plugin providing the prediction scheduler and the per-shooter board.
///
/// Uses an existing [`PredictionConfig`] resource if one was inserted
/// before the plugin is added.
pub struct PredictionPlugin;

impl Plugin for PredictionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PredictionConfig>();

        let config = app.world().resource::<PredictionConfig>().clone();
        info!(
            "Prediction: {} steps per request, look-ahead {} ticks",
            config.max_steps, config.look_ahead_ticks
        );

        app.insert_resource(PredictionScheduler::new(config))
            .init_resource::<PredictionBoard>();
    }
}

/// Configuration for trajectory prediction.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct PredictionConfig {
    /// Step size shared with the live simulation.
    pub dt: f64,
    /// Ticks between capturing a request and acting on it.
    pub look_ahead_ticks: u32,
    /// Maximum number of steps simulated per request.
    pub max_steps: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            dt: FIXED_DT,
            look_ahead_ticks: LOOK_AHEAD_TICKS,
            max_steps: MAX_PREDICTION_STEPS,
        }
    }
}
