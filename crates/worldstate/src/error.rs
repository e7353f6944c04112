//! World-state errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldStateError {
    #[error("leaf index {index} exceeds tree capacity {capacity}")]
    IndexOutOfRange { index: u64, capacity: u64 },

    #[error("world state backend: {0}")]
    Backend(String),
}

pub type WorldStateResult<T> = Result<T, WorldStateError>;
