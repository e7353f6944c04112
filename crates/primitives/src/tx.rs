//! The pending-transaction record consumed by the pipeline.

use crate::{
    asset::AssetId, bridge_call_data::BridgeCallData, bytes32::Bytes32, errors::PrimitivesError,
    proof_data::ProofData, tx_type::TxType,
};

/// Transaction identifier.
pub type TxId = Bytes32;

/// A validated, pending transaction as stored by the persistence layer.
///
/// Created by transaction-receipt logic, consumed by the rollup creator,
/// and immutable once included in a published rollup. `excess_gas` is the
/// one field the pipeline mutates, via the fee allocator.
#[derive(Clone, Debug)]
pub struct TxDao {
    pub id: TxId,
    /// Opaque proof blob; the leading bytes follow the fixed public-input
    /// layout of [`ProofData`].
    pub proof_data: Vec<u8>,
    /// Creation time, unix milliseconds.
    pub created: u64,
    pub tx_type: TxType,
    pub fee_asset_id: AssetId,
    /// Surplus gas assigned by the fee allocator.
    pub excess_gas: u64,
    pub bridge_call_data: Option<BridgeCallData>,
    /// Second-class transactions are scheduled only after all first-class
    /// pending transactions.
    pub second_class: bool,
}

impl TxDao {
    /// Parses the public-input fields out of the proof blob.
    pub fn proof(&self) -> Result<ProofData, PrimitivesError> {
        ProofData::parse(&self.proof_data)
    }

    /// The fee attached to this transaction, decoded from proof data.
    pub fn fee(&self) -> Result<u128, PrimitivesError> {
        Ok(self.proof()?.tx_fee())
    }

    /// Whether this transaction carries a non-zero fee.
    pub fn is_fee_paying(&self) -> Result<bool, PrimitivesError> {
        Ok(self.fee()? > 0)
    }
}
