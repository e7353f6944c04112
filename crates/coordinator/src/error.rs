//! Pipeline errors.

use tessera_bridge::BridgeError;
use tessera_creator::CreatorError;
use tessera_fees::FeeError;
use tessera_profiler::ProfilerError;
use tessera_worldstate::WorldStateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Exactly one run may be active per pipeline instance.
    #[error("pipeline is already running")]
    AlreadyRunning,

    /// `stop(throw_on_error)` found that a publish had already succeeded
    /// in the interrupted cycle.
    #[error("pipeline stopped after a rollup was already published")]
    StoppedAfterPublish,

    #[error("rollup store: {0}")]
    Store(String),

    #[error("publisher: {0}")]
    Publisher(String),

    #[error(transparent)]
    Creator(#[from] CreatorError),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Profiler(#[from] ProfilerError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    WorldState(#[from] WorldStateError),
}

impl PipelineError {
    /// Whether this error is the cooperative interruption signal rather
    /// than a failure.
    pub fn is_interruption(&self) -> bool {
        matches!(self, PipelineError::Creator(CreatorError::Interrupted))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
