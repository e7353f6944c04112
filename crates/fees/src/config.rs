//! Static fee parameters.

use std::collections::HashMap;

use tessera_primitives::{AssetId, TxType};

/// Operator-supplied fee parameters.
#[derive(Clone, Debug)]
pub struct FeeConfig {
    /// Shared verifier cost, divided across rollup slots.
    pub verification_gas: u64,
    /// Per-type fixed gas constants.
    pub gas_per_type: [u64; TxType::COUNT],
    /// Per-type call-data sizes in bytes.
    pub call_data_per_type: [u64; TxType::COUNT],
    /// Extra gas charged per transaction for specific assets (e.g. token
    /// transfers costing more than the base asset).
    pub asset_gas_overhead: HashMap<AssetId, u64>,
    /// Fee multiplier in basis points; 10_000 is 1.0.
    pub fee_multiplier_bps: u64,
    /// Optional cap applied to the oracle gas price.
    pub max_fee_gas_price: Option<u128>,
    /// Fees are rounded up to this many significant figures. The protocol
    /// must never under-charge, so rounding is always upward.
    pub num_significant_figures: u32,
    /// Call-data ceiling for one published rollup.
    pub max_rollup_call_data: u64,
    /// Gas ceiling for one published rollup.
    pub max_rollup_gas: u64,
}

impl FeeConfig {
    pub fn tx_gas(&self, ty: TxType) -> u64 {
        self.gas_per_type[ty.index()]
    }

    pub fn tx_call_data(&self, ty: TxType) -> u64 {
        self.call_data_per_type[ty.index()]
    }

    pub fn asset_overhead(&self, asset_id: AssetId) -> u64 {
        self.asset_gas_overhead.get(&asset_id).copied().unwrap_or(0)
    }
}
