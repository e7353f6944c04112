//! Inner rollup assembly: world-state insertion, backward-link
//! resolution, and proof-request construction, interruptible at every
//! per-transaction checkpoint.

mod creator;
mod error;
mod interrupt;
mod proof_service;

pub use creator::{RollupCreator, MAX_BRIDGE_CALLS_PER_ROLLUP};
pub use error::{CreatorError, CreatorResult};
pub use interrupt::InterruptFlag;
pub use proof_service::{InnerRollupRequest, ProofService, RollupProof};
