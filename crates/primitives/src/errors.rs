//! Error types for primitive decoding.

use ethnum::U256;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitivesError {
    #[error("proof data too short (expected at least {expected} bytes, got {got})")]
    MalformedProofData { expected: usize, got: usize },

    #[error("invalid tx type discriminant {0}")]
    InvalidTxType(u8),

    #[error("word must be 32 bytes, got {0}")]
    InvalidWordLength(usize),

    #[error("malformed bridge call data {0}")]
    MalformedBridgeCallData(U256),
}
