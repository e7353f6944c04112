//! Conversion between gas amounts and asset-denominated fees.

use std::sync::Arc;

use ethnum::U256;
use tessera_primitives::{AssetId, TxType};

use crate::{config::FeeConfig, oracle::PriceOracle};

/// A fee amount denominated in a specific asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AssetValue {
    pub asset_id: AssetId,
    pub value: u128,
}

/// Pure fee/gas conversion over live price data.
///
/// "Adjusted" gas accounts for transaction types that reduce how many fit
/// per rollup (call-data or gas ceilings): the shared verifier cost is
/// divided across the reduced slot count instead of the full one, so such
/// transactions carry a larger share.
pub struct FeeCalculator {
    config: FeeConfig,
    oracle: Arc<dyn PriceOracle>,
    total_slots: u64,
}

impl std::fmt::Debug for FeeCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeCalculator")
            .field("config", &self.config)
            .field("total_slots", &self.total_slots)
            .finish_non_exhaustive()
    }
}

impl FeeCalculator {
    pub fn new(config: FeeConfig, oracle: Arc<dyn PriceOracle>, total_slots: usize) -> Self {
        assert!(total_slots > 0, "rollup must have at least one slot");
        Self {
            config,
            oracle,
            total_slots: total_slots as u64,
        }
    }

    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Verifier-cost share of one slot, with no per-type adjustment.
    pub fn unadjusted_base_verification_gas(&self) -> u64 {
        self.config.verification_gas / self.total_slots
    }

    /// How many transactions of this type fit in one rollup, considering
    /// the call-data and gas ceilings.
    fn max_txs_per_rollup(&self, ty: TxType) -> u64 {
        let mut max = self.total_slots;
        let call_data = self.config.tx_call_data(ty);
        if call_data > 0 {
            max = max.min(self.config.max_rollup_call_data / call_data);
        }
        let gas = self.config.tx_gas(ty);
        if gas > 0 {
            max = max.min(self.config.max_rollup_gas / gas);
        }
        max.max(1)
    }

    /// Verifier-cost share charged to one transaction of this type. Uses a
    /// ceiling division so the protocol never under-charges.
    fn adjusted_base_verification_gas(&self, ty: TxType) -> u64 {
        self.config.verification_gas.div_ceil(self.max_txs_per_rollup(ty))
    }

    /// Total adjusted gas charged to one transaction.
    pub fn adjusted_tx_gas(&self, asset_id: AssetId, ty: TxType) -> u64 {
        self.adjusted_base_verification_gas(ty)
            + self.config.tx_gas(ty)
            + self.config.asset_overhead(asset_id)
    }

    /// Total unadjusted gas one transaction actually consumes.
    pub fn unadjusted_tx_gas(&self, asset_id: AssetId, ty: TxType) -> u64 {
        self.unadjusted_base_verification_gas()
            + self.config.tx_gas(ty)
            + self.config.asset_overhead(asset_id)
    }

    /// Adjusted minus unadjusted gas: the profit margin a transaction of
    /// this type contributes just by being included.
    pub fn tx_gas_adjustment(&self, asset_id: AssetId, ty: TxType) -> u64 {
        self.adjusted_tx_gas(asset_id, ty) - self.unadjusted_tx_gas(asset_id, ty)
    }

    pub fn tx_call_data(&self, ty: TxType) -> u64 {
        self.config.tx_call_data(ty)
    }

    /// Oracle gas price, capped by configuration.
    fn capped_gas_price(&self) -> u128 {
        let price = self.oracle.gas_price();
        match self.config.max_fee_gas_price {
            Some(cap) => price.min(cap),
            None => price,
        }
    }

    /// Price of one transaction of `ty` (paying in `tx_asset_id`),
    /// denominated in `fee_asset_id`.
    pub fn tx_fee(&self, tx_asset_id: AssetId, fee_asset_id: AssetId, ty: TxType) -> AssetValue {
        let gas = self.adjusted_tx_gas(tx_asset_id, ty);
        let value = self.gas_to_asset_value(fee_asset_id, gas);
        AssetValue {
            asset_id: fee_asset_id,
            value,
        }
    }

    /// Converts a gas amount to a fee in the given asset, rounding up to
    /// the configured number of significant figures.
    pub fn gas_to_asset_value(&self, fee_asset_id: AssetId, gas: u64) -> u128 {
        let asset_price = self.oracle.asset_price(fee_asset_id);
        if asset_price == 0 {
            return 0;
        }

        let wei = U256::from(gas) * U256::from(self.capped_gas_price())
            * U256::from(self.config.fee_multiplier_bps)
            / U256::from(10_000u64);
        let price = U256::from(asset_price);
        // Ceiling division: a fee must always cover the full gas cost.
        let value = ((wei + price - U256::ONE) / price).as_u128();
        round_up_significant_figures(value, self.config.num_significant_figures)
    }

    /// Economic inverse of [`Self::tx_fee`]: how much gas a fee amount
    /// purchases. Scaled integer arithmetic, floor-dividing once at the
    /// end.
    pub fn gas_paid_for_by_fee(&self, fee_asset_id: AssetId, fee: u128) -> u64 {
        let asset_price = self.oracle.asset_price(fee_asset_id);
        let gas_price = self.capped_gas_price();
        if asset_price == 0 || gas_price == 0 || self.config.fee_multiplier_bps == 0 {
            return 0;
        }

        let num = U256::from(fee) * U256::from(asset_price) * U256::from(10_000u64);
        let den = U256::from(gas_price) * U256::from(self.config.fee_multiplier_bps);
        let gas = num / den;
        gas.try_into().unwrap_or(u64::MAX)
    }

    /// Worst-case call data of a single transaction across all types. Used
    /// to reserve headroom so an in-flight rollup cannot run out of call
    /// data mid-batch.
    pub fn max_tx_call_data(&self) -> u64 {
        TxType::ALL
            .iter()
            .map(|ty| self.config.tx_call_data(*ty))
            .max()
            .unwrap_or(0)
    }

    /// Worst-case unadjusted gas of a single transaction across all
    /// configured assets and types.
    pub fn max_unadjusted_gas(&self) -> u64 {
        let max_overhead = self
            .config
            .asset_gas_overhead
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        TxType::ALL
            .iter()
            .map(|ty| self.unadjusted_base_verification_gas() + self.config.tx_gas(*ty))
            .max()
            .unwrap_or(0)
            + max_overhead
    }
}

/// Rounds up to `n` significant decimal figures. Never rounds down.
fn round_up_significant_figures(value: u128, n: u32) -> u128 {
    if value == 0 || n == 0 {
        return value;
    }
    let digits = value.ilog10() + 1;
    if digits <= n {
        return value;
    }
    let scale = 10u128.pow(digits - n);
    value.div_ceil(scale) * scale
}
