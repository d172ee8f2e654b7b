//! Lock-step simulation of every launch angle at once.
//!
//! All 360 candidates advance together one step at a time. The first
//! candidate to touch the target ends the whole simulation; candidates that
//! hit the Sun or another body drop out individually.

use bevy::math::DVec2;
use wide::f64x4;

use super::directions::DirectionTable;
use super::scheduler::CancelToken;
use super::snapshot::PredictionRequest;
use crate::physics::{overlaps, step_projectiles_x4};
use crate::types::{ANGLE_COUNT, NO_SOLUTION, SUN_COLLISION_RADIUS};

/// Candidates stepped together per SIMD batch.
const LANES: usize = 4;

const _: () = assert!(ANGLE_COUNT % LANES == 0);

/// Why a prediction ended without a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoSolutionReason {
    /// The step budget ran out.
    Exhausted,
    /// Every candidate was eliminated before reaching the target.
    AllEliminated,
    /// The prediction was cancelled because its target went away.
    TargetLost,
}

/// Final result of a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionOutcome {
    /// `angle` reaches the target after `step` steps.
    Hit { angle: u16, step: u32 },
    NoSolution(NoSolutionReason),
}

impl PredictionOutcome {
    pub fn angle(&self) -> Option<u16> {
        match self {
            PredictionOutcome::Hit { angle, .. } => Some(*angle),
            PredictionOutcome::NoSolution(_) => None,
        }
    }

    /// Winning angle, or [`NO_SOLUTION`] (`-1`).
    pub fn out_angle(&self) -> i32 {
        self.angle().map_or(NO_SOLUTION, i32::from)
    }
}

/// State after one call to [`TrajectoryPredictor::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Finished(PredictionOutcome),
}

/// Simulates one [`PredictionRequest`] to completion.
///
/// The predictor owns its request outright. It is also an [`Iterator`] over
/// step outcomes, yielding `Running` for every step that did not decide
/// anything and a final `Finished`, so callers can interleave steps with
/// other work.
pub struct TrajectoryPredictor {
    request: PredictionRequest,
    directions: DirectionTable,
    candidates: Vec<DVec2>,
    eliminated: Vec<bool>,
    remaining: usize,
    /// Reused `(position, scale)` list of attractors for the current step.
    sources: Vec<(DVec2, f64)>,
    steps_taken: u32,
    outcome: Option<PredictionOutcome>,
    cancel: Option<CancelToken>,
}

impl TrajectoryPredictor {
    pub fn new(request: PredictionRequest, directions: DirectionTable) -> Self {
        let sources = Vec::with_capacity(request.bodies.len() + 1);

        Self {
            candidates: vec![request.origin; ANGLE_COUNT],
            eliminated: vec![false; ANGLE_COUNT],
            remaining: ANGLE_COUNT,
            sources,
            steps_taken: 0,
            outcome: None,
            cancel: None,
            request,
            directions,
        }
    }

    /// Abort with [`NoSolutionReason::TargetLost`] once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn is_eliminated(&self, angle: usize) -> bool {
        self.eliminated[angle]
    }

    /// Candidates still in flight.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Current position of the candidate launched at `angle`.
    pub fn candidate(&self, angle: usize) -> DVec2 {
        self.candidates[angle]
    }

    /// Run every remaining step and return the outcome.
    pub fn run(mut self) -> PredictionOutcome {
        loop {
            if let StepOutcome::Finished(outcome) = self.step() {
                return outcome;
            }
        }
    }

    /// Advance the simulation by exactly one step.
    ///
    /// Once finished, further calls keep returning the same outcome without
    /// doing any work.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(outcome) = self.outcome {
            return StepOutcome::Finished(outcome);
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return self.finish(PredictionOutcome::NoSolution(NoSolutionReason::TargetLost));
        }
        if self.steps_taken >= self.request.max_steps {
            return self.finish(PredictionOutcome::NoSolution(NoSolutionReason::Exhausted));
        }

        self.steps_taken += 1;
        self.advance_bodies();

        if let Some(angle) = self.advance_candidates() {
            return self.finish(PredictionOutcome::Hit {
                angle,
                step: self.steps_taken,
            });
        }

        if self.remaining == 0 {
            return self.finish(PredictionOutcome::NoSolution(NoSolutionReason::AllEliminated));
        }
        if self.steps_taken >= self.request.max_steps {
            return self.finish(PredictionOutcome::NoSolution(NoSolutionReason::Exhausted));
        }

        StepOutcome::Running
    }

    fn finish(&mut self, outcome: PredictionOutcome) -> StepOutcome {
        self.outcome = Some(outcome);
        StepOutcome::Finished(outcome)
    }

    fn advance_bodies(&mut self) {
        let request = &mut self.request;
        request.target.advance();
        for body in request.bodies.iter_mut().flatten() {
            body.advance();
        }

        self.sources.clear();
        self.sources.push((request.target.pos, request.target.scale));
        self.sources
            .extend(request.bodies.iter().flatten().map(|b| (b.pos, b.scale)));
    }

    /// Move every live candidate; returns the first angle to hit the target.
    ///
    /// Candidates are stepped four at a time, then checked in angle order.
    fn advance_candidates(&mut self) -> Option<u16> {
        let request = &self.request;
        let projectile = request.projectile;
        let dt = self.directions.dt();
        let target_reach = projectile.collision_radius + request.target.collision_radius;
        let sun_reach = projectile.collision_radius + SUN_COLLISION_RADIUS;

        for first in (0..ANGLE_COUNT).step_by(LANES) {
            let lanes = first..first + LANES;
            if self.eliminated[lanes.clone()].iter().all(|&gone| gone) {
                continue;
            }

            let pos = &self.candidates[lanes.clone()];
            let shifts: [DVec2; LANES] = std::array::from_fn(|lane| self.directions.shift(first + lane));
            let (xs, ys) = step_projectiles_x4(
                f64x4::new(std::array::from_fn(|lane| pos[lane].x)),
                f64x4::new(std::array::from_fn(|lane| pos[lane].y)),
                f64x4::new(shifts.map(|s| s.x)),
                f64x4::new(shifts.map(|s| s.y)),
                projectile.speed,
                projectile.mass,
                dt,
                &self.sources,
            );
            let (xs, ys) = (xs.to_array(), ys.to_array());

            for (lane, angle) in lanes.enumerate() {
                if self.eliminated[angle] {
                    continue;
                }

                let pos = DVec2::new(xs[lane], ys[lane]);
                self.candidates[angle] = pos;

                if overlaps(pos, request.target.pos, target_reach) {
                    return Some(angle as u16);
                }

                let crashed = overlaps(pos, DVec2::ZERO, sun_reach)
                    || request.bodies.iter().enumerate().any(|(slot, body)| {
                        slot != request.shooter
                            && body.as_ref().is_some_and(|b| {
                                overlaps(pos, b.pos, projectile.collision_radius + b.collision_radius)
                            })
                    });

                if crashed {
                    self.eliminated[angle] = true;
                    self.remaining -= 1;
                }
            }
        }

        None
    }
}

impl Iterator for TrajectoryPredictor {
    type Item = StepOutcome;

    fn next(&mut self) -> Option<StepOutcome> {
        if self.outcome.is_some() {
            return None;
        }
        Some(self.step())
    }
}
