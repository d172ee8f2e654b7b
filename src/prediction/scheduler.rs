//! Background scheduling of trajectory predictions.
//!
//! The scheduler freezes the world `look_ahead_ticks` into the future, hands
//! the snapshot to a [`TrajectoryPredictor`] running on Bevy's async compute
//! pool, and returns a [`PredictionHandle`] straight away. The handle is
//! polled; it never exposes a result before the task has finished.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task, TaskPool};

use super::directions::DirectionTable;
use super::predictor::{NoSolutionReason, PredictionOutcome, TrajectoryPredictor};
use super::snapshot::{LiveBody, PredictionRequest, ProjectileSpec};
use super::PredictionConfig;
use crate::types::Slot;

/// Reasons a prediction cannot be scheduled.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("no live target to aim at")]
    TargetMissing,

    #[error("shooter slot {0} is empty or out of range")]
    ShooterMissing(Slot),

    #[error("invalid projectile: {0}")]
    InvalidProjectile(&'static str),
}

/// Shared flag a running prediction checks before every step.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-side view of one prediction running in the background.
pub struct PredictionHandle {
    shooter: Slot,
    generation: u64,
    issued_tick: u64,
    ready_tick: u64,
    task: Option<Task<PredictionOutcome>>,
    outcome: Option<PredictionOutcome>,
    cancel: CancelToken,
}

impl PredictionHandle {
    pub fn shooter(&self) -> Slot {
        self.shooter
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn issued_tick(&self) -> u64 {
        self.issued_tick
    }

    /// First tick at which the result describes the live world.
    pub fn ready_tick(&self) -> u64 {
        self.ready_tick
    }

    /// Whether the caller's clock has reached the ready tick.
    pub fn is_due(&self, tick: u64) -> bool {
        tick >= self.ready_tick
    }

    /// Ticks past the ready tick, zero if not yet due.
    pub fn overdue_by(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.ready_tick)
    }

    /// Whether the background task has produced its result.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some() || self.task.as_ref().is_some_and(Task::is_finished)
    }

    /// Non-blocking check for the result.
    ///
    /// Returns `None` while the task is still running.
    pub fn poll(&mut self) -> Option<PredictionOutcome> {
        if self.outcome.is_none() && self.task.as_ref().is_some_and(Task::is_finished) {
            if let Some(task) = self.task.take() {
                self.outcome = Some(block_on(task));
            }
        }
        self.outcome
    }

    /// Block until the result is available.
    pub fn wait(mut self) -> PredictionOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        match self.task.take() {
            Some(task) => block_on(task),
            None => PredictionOutcome::NoSolution(NoSolutionReason::TargetLost),
        }
    }

    /// Ask the running predictor to stop at its next step.
    ///
    /// Dropping the handle does the same.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PredictionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for PredictionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionHandle")
            .field("shooter", &self.shooter)
            .field("generation", &self.generation)
            .field("issued_tick", &self.issued_tick)
            .field("ready_tick", &self.ready_tick)
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// Builds requests and launches them on the async compute pool.
#[derive(Resource, Clone, Debug)]
pub struct PredictionScheduler {
    directions: DirectionTable,
    config: PredictionConfig,
}

impl PredictionScheduler {
    /// Create a scheduler; the direction table is built here, once.
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            directions: DirectionTable::new(config.dt),
            config,
        }
    }

    pub fn directions(&self) -> &DirectionTable {
        &self.directions
    }

    /// Freeze the world `look_ahead_ticks` ahead.
    pub fn capture(
        &self,
        target: Option<&LiveBody>,
        bodies: &[Option<LiveBody>],
        shooter: Slot,
        projectile: ProjectileSpec,
    ) -> Result<PredictionRequest, PredictionError> {
        PredictionRequest::capture(target, bodies, shooter, projectile, &self.config)
    }

    /// A predictor for `request` sharing this scheduler's direction table.
    pub fn predictor(&self, request: PredictionRequest) -> TrajectoryPredictor {
        TrajectoryPredictor::new(request, self.directions.clone())
    }

    /// Start `request` in the background and return its handle immediately.
    pub fn launch(&self, request: PredictionRequest, issued_tick: u64, generation: u64) -> PredictionHandle {
        let shooter = request.shooter;
        debug!(
            "Predicting for shooter {} against {} bodies, ready at tick {}",
            shooter,
            request.live_bodies(),
            issued_tick + u64::from(self.config.look_ahead_ticks)
        );
        let cancel = CancelToken::default();
        let predictor = self.predictor(request).with_cancel(cancel.clone());

        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::default);
        let task = pool.spawn(async move { predictor.run() });

        PredictionHandle {
            shooter,
            generation,
            issued_tick,
            ready_tick: issued_tick + u64::from(self.config.look_ahead_ticks),
            task: Some(task),
            outcome: None,
            cancel,
        }
    }

    /// Capture and launch in one go.
    pub fn schedule(
        &self,
        target: Option<&LiveBody>,
        bodies: &[Option<LiveBody>],
        shooter: Slot,
        projectile: ProjectileSpec,
        issued_tick: u64,
        generation: u64,
    ) -> Result<PredictionHandle, PredictionError> {
        let request = self.capture(target, bodies, shooter, projectile)?;
        Ok(self.launch(request, issued_tick, generation))
    }
}

impl Default for PredictionScheduler {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

/// Outstanding predictions, at most one per shooter.
///
/// Submitting for a shooter that already has a prediction in flight cancels
/// the old one. Every submission gets a fresh generation number, so a caller
/// holding on to an older generation can tell it has been superseded.
#[derive(Resource, Default, Debug)]
pub struct PredictionBoard {
    handles: HashMap<Slot, PredictionHandle>,
    next_generation: u64,
}

impl PredictionBoard {
    /// Schedule a prediction for `shooter`, replacing any previous one.
    ///
    /// Returns the new generation number.
    pub fn submit(
        &mut self,
        scheduler: &PredictionScheduler,
        target: Option<&LiveBody>,
        bodies: &[Option<LiveBody>],
        shooter: Slot,
        projectile: ProjectileSpec,
        issued_tick: u64,
    ) -> Result<u64, PredictionError> {
        let generation = self.next_generation;
        let handle = scheduler.schedule(target, bodies, shooter, projectile, issued_tick, generation)?;
        self.next_generation += 1;

        if let Some(previous) = self.handles.insert(shooter, handle) {
            debug!(
                "Prediction generation {} for shooter {} superseded by {}",
                previous.generation(),
                shooter,
                generation
            );
            previous.cancel();
        }

        Ok(generation)
    }

    pub fn get(&self, shooter: Slot) -> Option<&PredictionHandle> {
        self.handles.get(&shooter)
    }

    pub fn get_mut(&mut self, shooter: Slot) -> Option<&mut PredictionHandle> {
        self.handles.get_mut(&shooter)
    }

    /// Take the handle for `shooter` out of the board.
    pub fn take(&mut self, shooter: Slot) -> Option<PredictionHandle> {
        self.handles.remove(&shooter)
    }

    /// Cancel and drop the prediction for `shooter`.
    pub fn cancel(&mut self, shooter: Slot) -> bool {
        match self.handles.remove(&shooter) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel and drop every outstanding prediction.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
