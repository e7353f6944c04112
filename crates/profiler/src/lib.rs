//! Profitability profiling of candidate rollup batches.
//!
//! A profile's non-negative gas balance is the sole admissibility
//! criterion for publishing: it nets each transaction's adjustment margin
//! and excess gas against the rollup's fixed costs (empty-slot
//! verification shares and un-recouped bridge gas).

mod error;
mod profile;
mod profiler;

pub use error::{ProfilerError, ProfilerResult};
pub use profile::{BridgeProfile, RollupProfile};
pub use profiler::profile_rollup;
