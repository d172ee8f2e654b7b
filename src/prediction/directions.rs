//! Launch direction lookup table.

use std::sync::Arc;

use bevy::math::DVec2;

use crate::types::{heading, ANGLE_COUNT};

/// Per-angle heading displacement for one step at unit speed.
///
/// Built once and shared by every prediction through an `Arc`; cloning the
/// table only bumps a reference count.
#[derive(Clone, Debug)]
pub struct DirectionTable {
    shifts: Arc<[DVec2]>,
    dt: f64,
}

impl DirectionTable {
    /// Build the table for step size `dt`.
    pub fn new(dt: f64) -> Self {
        let shifts: Vec<DVec2> = (0..ANGLE_COUNT)
            .map(|angle| heading(angle as f64) * dt)
            .collect();

        Self {
            shifts: shifts.into(),
            dt,
        }
    }

    /// Displacement for `angle` degrees (0..360) at unit speed.
    #[inline]
    pub fn shift(&self, angle: usize) -> DVec2 {
        self.shifts[angle]
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Whether two handles point at the same underlying table.
    #[cfg(test)]
    pub(crate) fn shares_storage(&self, other: &DirectionTable) -> bool {
        Arc::ptr_eq(&self.shifts, &other.shifts)
    }
}
