//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `LocoError` as one variant
//! where they need to surface core failures.

use thiserror::Error;

use crate::{BodyId, EntityHandle};

/// The top-level error type for `loco-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum LocoError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityHandle),

    #[error("body {0} not found")]
    BodyNotFound(BodyId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `loco-*` crates.
pub type LocoResult<T> = Result<T, LocoError>;
