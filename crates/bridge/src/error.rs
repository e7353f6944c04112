//! Bridge resolution errors.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    /// The bridge id has no configuration entry. Indicates a configuration
    /// mismatch rather than a transient condition; never retried.
    #[error("unrecognized bridge address id {0}")]
    UnrecognizedBridge(u32),

    /// Configuration entry is unusable (e.g. zero transaction count).
    #[error("invalid configuration for bridge {0}")]
    InvalidBridgeConfig(u32),

    #[error("bridge contract query failed: {0}")]
    Contract(String),

    #[error("subsidy provider query failed: {0}")]
    SubsidyProvider(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
