//! Physics-subsystem error type.

use thiserror::Error;

use loco_core::BodyId;

use crate::Capability;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("body {0} not found")]
    BodyNotFound(BodyId),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("backend does not support {0:?}")]
    Unsupported(Capability),
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
