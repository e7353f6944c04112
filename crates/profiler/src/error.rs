//! Profiler errors.

use tessera_bridge::BridgeError;
use tessera_primitives::{PrimitivesError, TxId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("batch of {len} txs exceeds rollup capacity {capacity}")]
    BatchTooLarge { len: usize, capacity: usize },

    #[error("defi deposit {0} has no bridge call data")]
    MissingBridgeCallData(TxId),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

pub type ProfilerResult<T> = Result<T, ProfilerError>;
