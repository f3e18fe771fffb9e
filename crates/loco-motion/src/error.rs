//! Locomotion error type.

use thiserror::Error;

use loco_core::BodyId;
use loco_physics::PhysicsError;

#[derive(Debug, Error)]
pub enum MotionError {
    /// `height − 2·radius − walk_up_height` is negative.
    #[error("capsule segment is negative (height {height}, radius {radius}, walk-up {walk_up_height})")]
    NegativeSegment { height: f32, radius: f32, walk_up_height: f32 },

    #[error("capsule radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("character body {0} not found")]
    BodyNotFound(BodyId),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

pub type MotionResult<T> = Result<T, MotionError>;
