use thiserror::Error;

use loco_core::{EntityHandle, LocoError};
use loco_motion::MotionError;
use loco_physics::PhysicsError;
use loco_task::TaskError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] LocoError),

    #[error("entity {0:?} does not exist")]
    EntityNotFound(EntityHandle),

    #[error("entity {0:?} is not a character")]
    NotACharacter(EntityHandle),

    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("locomotion error: {0}")]
    Motion(#[from] MotionError),

    /// Corrupt persisted task data.  Loading aborts.
    #[error("task error: {0}")]
    Task(#[from] TaskError),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
