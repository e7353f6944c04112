//! Shared fixtures for fee tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use ethnum::U256;
use tessera_bridge::{
    BridgeConfig, BridgeContract, BridgeResolver, BridgeResult, BridgeSubsidy, SubsidyProvider,
};
use tessera_primitives::{AssetId, BridgeCallData, TxType};

use crate::{calculator::FeeCalculator, config::FeeConfig, oracle::PriceOracle};

pub(crate) const TEST_BRIDGE_ID: u32 = 1;
pub(crate) const TEST_BRIDGE_GAS: u64 = 500_000;
pub(crate) const TEST_BRIDGE_NUM_TXS: u32 = 5;

pub(crate) struct FixedOracle {
    pub(crate) gas_price: u128,
    pub(crate) prices: HashMap<AssetId, u128>,
}

impl PriceOracle for FixedOracle {
    fn gas_price(&self) -> u128 {
        self.gas_price
    }

    fn asset_price(&self, asset_id: AssetId) -> u128 {
        self.prices.get(&asset_id).copied().unwrap_or(0)
    }
}

struct NoContract;

#[async_trait]
impl BridgeContract for NoContract {
    async fn full_bridge_gas(&self, bridge_address_id: u32) -> BridgeResult<u64> {
        Err(tessera_bridge::BridgeError::UnrecognizedBridge(
            bridge_address_id,
        ))
    }
}

struct NoSubsidies;

#[async_trait]
impl SubsidyProvider for NoSubsidies {
    async fn bridge_subsidy(&self, _call_data: U256) -> BridgeResult<Option<BridgeSubsidy>> {
        Ok(None)
    }
}

/// Flat gas tables: no per-type constants, no ceilings that bind, so
/// adjusted and unadjusted gas coincide and arithmetic stays legible.
pub(crate) fn flat_fee_config(verification_gas: u64) -> FeeConfig {
    FeeConfig {
        verification_gas,
        gas_per_type: [0; TxType::COUNT],
        call_data_per_type: [0; TxType::COUNT],
        asset_gas_overhead: HashMap::new(),
        fee_multiplier_bps: 10_000,
        max_fee_gas_price: None,
        num_significant_figures: 0,
        max_rollup_call_data: u64::MAX,
        max_rollup_gas: u64::MAX,
    }
}

pub(crate) fn unit_price_calculator(config: FeeConfig, total_slots: usize) -> Arc<FeeCalculator> {
    let oracle = FixedOracle {
        gas_price: 1,
        prices: HashMap::from([(AssetId(0), 1), (AssetId(1), 1)]),
    };
    Arc::new(FeeCalculator::new(config, Arc::new(oracle), total_slots))
}

pub(crate) fn test_bridge_resolver() -> Arc<BridgeResolver> {
    Arc::new(BridgeResolver::new(
        vec![BridgeConfig {
            bridge_address_id: TEST_BRIDGE_ID,
            permitted_assets: vec![AssetId(0), AssetId(1)],
            gas: Some(TEST_BRIDGE_GAS),
            num_txs: TEST_BRIDGE_NUM_TXS,
        }],
        Arc::new(NoContract),
        Arc::new(NoSubsidies),
    ))
}

pub(crate) fn test_call_data() -> BridgeCallData {
    BridgeCallData {
        bridge_address_id: TEST_BRIDGE_ID,
        input_asset_id_a: AssetId(0),
        input_asset_id_b: None,
        output_asset_id_a: AssetId(0),
        output_asset_id_b: None,
        aux_data: 0,
    }
}
