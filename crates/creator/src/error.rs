//! Rollup creation errors.

use tessera_primitives::{PrimitivesError, TxId};
use tessera_worldstate::WorldStateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreatorError {
    /// Deliberate cooperative abort, not a failure.
    #[error("rollup creation interrupted")]
    Interrupted,

    #[error("batch of {len} txs exceeds inner rollup capacity {capacity}")]
    BatchTooLarge { len: usize, capacity: usize },

    #[error("tx {0} references a bridge call absent from the rollup's bridge list")]
    UnlistedBridgeCallData(TxId),

    #[error("proof service rejected the rollup: {0}")]
    ProofRejected(String),

    #[error(transparent)]
    WorldState(#[from] WorldStateError),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

pub type CreatorResult<T> = Result<T, CreatorError>;
