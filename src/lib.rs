//! Orbital Salvo - predictive aiming for rockets in a toy star system
//!
//! A library crate providing the gravity model, the lock-step trajectory
//! predictor, its background scheduler, and the live simulation that fires
//! the predicted shots.

pub mod fire_control;
pub mod physics;
pub mod prediction;
pub mod scenario;
pub mod types;

#[cfg(test)]
pub mod test_utils;
