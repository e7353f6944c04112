//! The pipeline coordinator: the top-level scheduler driving batch
//! selection, inner rollup creation, aggregation, and publication.

mod config;
mod coordinator;
mod error;
#[cfg(test)]
mod test_utils;
mod traits;

pub use config::PipelineConfig;
pub use coordinator::{PipelineCoordinator, PipelineState};
pub use error::{PipelineError, PipelineResult};
pub use traits::{RollupPayload, RollupPublisher, RollupStore};
