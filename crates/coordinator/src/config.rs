//! Pipeline configuration.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum age of the oldest pending transaction before a rollup is
    /// published regardless of capacity.
    pub publish_interval: Duration,
    /// Transactions per inner rollup.
    pub inner_rollup_size: usize,
    /// Inner rollups per published outer rollup.
    pub outer_rollup_size: usize,
    /// Exit-only mode admits batches with no fee-paying asset.
    pub exit_only: bool,
}

impl PipelineConfig {
    /// Transactions per published outer rollup.
    pub fn capacity(&self) -> usize {
        self.inner_rollup_size * self.outer_rollup_size
    }
}
