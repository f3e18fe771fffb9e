//! Task error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// A persisted task record carries a tag no constructor is registered for.
    #[error("unknown task kind {0:?}")]
    UnknownKind(String),

    #[error("task record {kind:?} is missing its {field}")]
    MissingField { kind: String, field: &'static str },
}

pub type TaskResult<T> = Result<T, TaskError>;
