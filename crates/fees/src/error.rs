//! Fee computation and allocation errors.

use tessera_bridge::BridgeError;
use tessera_primitives::{AssetId, PrimitivesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeeError {
    /// A batch may pay fees in at most one distinct asset.
    #[error("batch pays fees in multiple assets: {0:?}")]
    MultipleFeePayingAssets(Vec<AssetId>),

    /// Outside exit-only mode, a batch must contain a fee-paying asset.
    #[error("batch has no fee-paying transactions")]
    NoFeePayingAsset,

    /// Surplus gas with no transaction to assign it to. Should never occur
    /// for a batch that passed validation.
    #[error("failed to attribute {0} surplus gas to any transaction")]
    UnattributableSurplus(u64),

    /// A DeFi deposit must carry a bridge call descriptor.
    #[error("defi deposit {0} has no bridge call data")]
    MissingBridgeCallData(tessera_primitives::TxId),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

pub type FeeResult<T> = Result<T, FeeError>;
