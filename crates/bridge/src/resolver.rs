//! Bridge resolver: configuration lookup, gas budgets, subsidy cache.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use ethnum::U256;
use parking_lot::Mutex;
use tessera_primitives::BridgeCallData;
use tracing::debug;

use crate::{
    config::BridgeConfig,
    error::{BridgeError, BridgeResult},
    subsidy::{BridgeContract, BridgeSubsidy, SubsidyProvider},
};

/// Resolves bridge call descriptors against static configuration and the
/// on-chain gas/subsidy collaborators.
///
/// The subsidy cache is the one piece of shared state: cleared in full on
/// each new base-chain block, never partially evicted.
pub struct BridgeResolver {
    configs: Vec<BridgeConfig>,
    contract: Arc<dyn BridgeContract>,
    subsidy_provider: Arc<dyn SubsidyProvider>,
    subsidy_cache: Mutex<HashMap<U256, Option<BridgeSubsidy>>>,
    subsidies_enabled: AtomicBool,
}

impl std::fmt::Debug for BridgeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeResolver")
            .field("configs", &self.configs)
            .finish_non_exhaustive()
    }
}

impl BridgeResolver {
    pub fn new(
        configs: Vec<BridgeConfig>,
        contract: Arc<dyn BridgeContract>,
        subsidy_provider: Arc<dyn SubsidyProvider>,
    ) -> Self {
        Self {
            configs,
            contract,
            subsidy_provider,
            subsidy_cache: Mutex::new(HashMap::new()),
            subsidies_enabled: AtomicBool::new(true),
        }
    }

    /// Administratively enables or disables subsidy lookups. When disabled,
    /// [`Self::bridge_subsidy`] returns `None` without querying the chain.
    pub fn set_subsidies_enabled(&self, enabled: bool) {
        self.subsidies_enabled.store(enabled, Ordering::Relaxed);
    }

    /// The configuration entry matching the call data, if any. Auxiliary
    /// data and virtual asset ids are ignored; an unmatched descriptor is
    /// not an error.
    pub fn bridge_config(&self, call_data: &BridgeCallData) -> Option<&BridgeConfig> {
        self.configs.iter().find(|c| c.matches(call_data))
    }

    /// The full gas budget for the interaction: the configured value, or an
    /// on-chain query when unset. An unrecognized bridge id is a hard
    /// error.
    pub async fn full_bridge_gas(&self, call_data: &BridgeCallData) -> BridgeResult<u64> {
        let config = self
            .bridge_config(call_data)
            .ok_or(BridgeError::UnrecognizedBridge(call_data.bridge_address_id))?;

        match config.gas {
            Some(gas) => Ok(gas),
            None => {
                self.contract
                    .full_bridge_gas(config.bridge_address_id)
                    .await
            }
        }
    }

    /// Minimum gas a single transaction must contribute towards the
    /// interaction: the full budget divided across the configured
    /// transaction count. Plain integer division, no ceiling.
    pub async fn min_bridge_tx_gas(&self, call_data: &BridgeCallData) -> BridgeResult<u64> {
        let config = self
            .bridge_config(call_data)
            .ok_or(BridgeError::UnrecognizedBridge(call_data.bridge_address_id))?;
        if config.num_txs == 0 {
            return Err(BridgeError::InvalidBridgeConfig(config.bridge_address_id));
        }

        let full = self.full_bridge_gas(call_data).await?;
        Ok(full / u64::from(config.num_txs))
    }

    /// The subsidy currently offered for this exact call data, cached until
    /// the next base-chain block.
    pub async fn bridge_subsidy(
        &self,
        call_data: &BridgeCallData,
    ) -> BridgeResult<Option<BridgeSubsidy>> {
        if !self.subsidies_enabled.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let key = call_data.encode();
        if let Some(cached) = self.subsidy_cache.lock().get(&key) {
            return Ok(*cached);
        }

        let subsidy = self.subsidy_provider.bridge_subsidy(key).await?;
        self.subsidy_cache.lock().insert(key, subsidy);
        Ok(subsidy)
    }

    /// Per-block state advance signal. Invalidates the subsidy cache
    /// wholesale.
    pub fn on_new_eth_block(&self) {
        let mut cache = self.subsidy_cache.lock();
        debug!(entries = cache.len(), "clearing bridge subsidy cache");
        cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tessera_primitives::{asset::VIRTUAL_ASSET_ID_FLAG, AssetId};

    use super::*;

    struct FixedContract {
        gas: u64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BridgeContract for FixedContract {
        async fn full_bridge_gas(&self, _bridge_address_id: u32) -> BridgeResult<u64> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.gas)
        }
    }

    struct CountingSubsidies {
        subsidy: Option<BridgeSubsidy>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SubsidyProvider for CountingSubsidies {
        async fn bridge_subsidy(&self, _call_data: U256) -> BridgeResult<Option<BridgeSubsidy>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.subsidy)
        }
    }

    fn call_data(bridge: u32, aux: u64) -> BridgeCallData {
        BridgeCallData {
            bridge_address_id: bridge,
            input_asset_id_a: AssetId(0),
            input_asset_id_b: None,
            output_asset_id_a: AssetId(0),
            output_asset_id_b: None,
            aux_data: aux,
        }
    }

    fn resolver_with(
        gas: Option<u64>,
        subsidy: Option<BridgeSubsidy>,
    ) -> (Arc<FixedContract>, Arc<CountingSubsidies>, BridgeResolver) {
        let contract = Arc::new(FixedContract {
            gas: 700_000,
            calls: AtomicUsize::new(0),
        });
        let subsidies = Arc::new(CountingSubsidies {
            subsidy,
            calls: AtomicUsize::new(0),
        });
        let resolver = BridgeResolver::new(
            vec![BridgeConfig {
                bridge_address_id: 1,
                permitted_assets: vec![AssetId(0)],
                gas,
                num_txs: 5,
            }],
            contract.clone(),
            subsidies.clone(),
        );
        (contract, subsidies, resolver)
    }

    #[tokio::test]
    async fn unknown_bridge_config_is_none_not_error() {
        let (_, _, resolver) = resolver_with(Some(500_000), None);
        assert!(resolver.bridge_config(&call_data(42, 0)).is_none());
    }

    #[tokio::test]
    async fn unknown_bridge_gas_is_hard_error() {
        let (_, _, resolver) = resolver_with(Some(500_000), None);
        let err = resolver.full_bridge_gas(&call_data(42, 0)).await.unwrap_err();
        assert!(matches!(err, BridgeError::UnrecognizedBridge(42)));
    }

    #[tokio::test]
    async fn configured_gas_wins_over_contract() {
        let (contract, _, resolver) = resolver_with(Some(500_000), None);
        assert_eq!(
            resolver.full_bridge_gas(&call_data(1, 0)).await.unwrap(),
            500_000
        );
        assert_eq!(contract.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn unset_gas_falls_back_to_contract() {
        let (contract, _, resolver) = resolver_with(None, None);
        assert_eq!(
            resolver.full_bridge_gas(&call_data(1, 0)).await.unwrap(),
            700_000
        );
        assert_eq!(contract.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn min_bridge_tx_gas_floor_divides() {
        let (_, _, resolver) = resolver_with(Some(500_001), None);
        // 500_001 / 5 floors.
        assert_eq!(
            resolver.min_bridge_tx_gas(&call_data(1, 0)).await.unwrap(),
            100_000
        );
    }

    #[tokio::test]
    async fn config_lookup_ignores_aux_and_virtual_assets() {
        let (_, _, resolver) = resolver_with(Some(500_000), None);
        let a = resolver
            .bridge_config(&call_data(1, 1))
            .map(|c| c.bridge_address_id);

        let mut with_virtual = call_data(1, 2);
        with_virtual.input_asset_id_b = Some(AssetId(VIRTUAL_ASSET_ID_FLAG + 5));
        let b = resolver
            .bridge_config(&with_virtual)
            .map(|c| c.bridge_address_id);

        assert_eq!(a, Some(1));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn subsidy_cached_per_exact_call_data() {
        let subsidy = Some(BridgeSubsidy { gas: 50_000 });
        let (_, provider, resolver) = resolver_with(Some(500_000), subsidy);

        let cd = call_data(1, 0);
        assert_eq!(resolver.bridge_subsidy(&cd).await.unwrap(), subsidy);
        assert_eq!(resolver.bridge_subsidy(&cd).await.unwrap(), subsidy);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 1);

        // Different aux data is a different cache key.
        resolver.bridge_subsidy(&call_data(1, 9)).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn new_block_invalidates_cache_wholesale() {
        let subsidy = Some(BridgeSubsidy { gas: 50_000 });
        let (_, provider, resolver) = resolver_with(Some(500_000), subsidy);

        let cd = call_data(1, 0);
        resolver.bridge_subsidy(&cd).await.unwrap();
        resolver.on_new_eth_block();

        // Re-fetched exactly once on next access, even if unchanged.
        resolver.bridge_subsidy(&cd).await.unwrap();
        resolver.bridge_subsidy(&cd).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn disabled_subsidies_skip_the_provider() {
        let subsidy = Some(BridgeSubsidy { gas: 50_000 });
        let (_, provider, resolver) = resolver_with(Some(500_000), subsidy);

        resolver.set_subsidies_enabled(false);
        assert_eq!(resolver.bridge_subsidy(&call_data(1, 0)).await.unwrap(), None);
        assert_eq!(provider.calls.load(Ordering::Relaxed), 0);
    }
}
