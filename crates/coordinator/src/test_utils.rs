//! Scripted collaborators for exercising the pipeline end to end.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use ethnum::U256;
use parking_lot::Mutex;
use tessera_bridge::{
    BridgeConfig, BridgeContract, BridgeError, BridgeResolver, BridgeResult, BridgeSubsidy,
    SubsidyProvider,
};
use tessera_creator::{CreatorResult, InnerRollupRequest, ProofService, RollupCreator, RollupProof};
use tessera_fees::{FeeCalculator, FeeConfig, PriceOracle};
use tessera_primitives::{AssetId, TxDao, TxId, TxType};
use tessera_worldstate::MemoryWorldState;

use crate::{
    config::PipelineConfig,
    coordinator::PipelineCoordinator,
    error::PipelineResult,
    traits::{RollupPayload, RollupPublisher, RollupStore},
};

#[derive(Default)]
pub(crate) struct ScriptedStore {
    pending: Mutex<Vec<TxDao>>,
    second_class: Mutex<Vec<TxDao>>,
    next_id: AtomicU64,
    proofs_added: AtomicUsize,
    confirmed: Mutex<Vec<TxId>>,
    mined: Mutex<Vec<TxId>>,
    fetch_delay: Mutex<Option<Duration>>,
}

impl ScriptedStore {
    pub(crate) fn seed(&self, txs: Vec<TxDao>) {
        self.pending.lock().extend(txs);
    }

    pub(crate) fn seed_second_class(&self, txs: Vec<TxDao>) {
        self.second_class.lock().extend(txs);
    }

    pub(crate) fn confirmed(&self) -> Vec<TxId> {
        self.confirmed.lock().clone()
    }

    pub(crate) fn proofs_added(&self) -> usize {
        self.proofs_added.load(Ordering::Relaxed)
    }

    pub(crate) fn mined(&self) -> Vec<TxId> {
        self.mined.lock().clone()
    }

    /// Makes every pending-tx fetch take this long, to hold a cycle open.
    pub(crate) fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = Some(delay);
    }
}

#[async_trait]
impl RollupStore for ScriptedStore {
    async fn pending_txs(&self, take: usize) -> PipelineResult<Vec<TxDao>> {
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.pending.lock().iter().take(take).cloned().collect())
    }

    async fn pending_second_class_txs(&self, take: usize) -> PipelineResult<Vec<TxDao>> {
        Ok(self.second_class.lock().iter().take(take).cloned().collect())
    }

    async fn next_rollup_id(&self) -> PipelineResult<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    async fn add_rollup_proofs(&self, proofs: &[RollupProof]) -> PipelineResult<()> {
        self.proofs_added.fetch_add(proofs.len(), Ordering::Relaxed);
        Ok(())
    }

    async fn confirm_sent(&self, _rollup_id: u64, tx_ids: &[TxId]) -> PipelineResult<()> {
        self.pending.lock().retain(|tx| !tx_ids.contains(&tx.id));
        self.second_class
            .lock()
            .retain(|tx| !tx_ids.contains(&tx.id));
        self.confirmed.lock().extend_from_slice(tx_ids);
        Ok(())
    }

    async fn confirm_mined(&self, _rollup_id: u64, tx_ids: &[TxId]) -> PipelineResult<()> {
        self.mined.lock().extend_from_slice(tx_ids);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct ScriptedPublisher {
    script: Mutex<VecDeque<bool>>,
    payloads: Mutex<Vec<RollupPayload>>,
}

impl ScriptedPublisher {
    /// Outcomes for successive publish calls; exhausted scripts succeed.
    pub(crate) fn script(&self, outcomes: Vec<bool>) {
        *self.script.lock() = outcomes.into();
    }

    pub(crate) fn payloads(&self) -> Vec<RollupPayload> {
        self.payloads.lock().clone()
    }
}

#[async_trait]
impl RollupPublisher for ScriptedPublisher {
    async fn publish(&self, payload: &RollupPayload) -> PipelineResult<bool> {
        self.payloads.lock().push(payload.clone());
        Ok(self.script.lock().pop_front().unwrap_or(true))
    }
}

struct FixedProofService;

#[async_trait]
impl ProofService for FixedProofService {
    async fn create_proof(&self, _request: &InnerRollupRequest) -> CreatorResult<Vec<u8>> {
        Ok(vec![0xcd; 32])
    }

    fn interrupt(&self) {}
}

struct UnitOracle;

impl PriceOracle for UnitOracle {
    fn gas_price(&self) -> u128 {
        1
    }

    fn asset_price(&self, _asset_id: AssetId) -> u128 {
        1
    }
}

struct NoContract;

#[async_trait]
impl BridgeContract for NoContract {
    async fn full_bridge_gas(&self, bridge_address_id: u32) -> BridgeResult<u64> {
        Err(BridgeError::UnrecognizedBridge(bridge_address_id))
    }
}

struct NoSubsidies;

#[async_trait]
impl SubsidyProvider for NoSubsidies {
    async fn bridge_subsidy(&self, _call_data: U256) -> BridgeResult<Option<BridgeSubsidy>> {
        Ok(None)
    }
}

/// Fully wired coordinator over scripted collaborators, flat zero-cost
/// fee tables, and an in-memory world state.
pub(crate) struct Fixture {
    pub(crate) store: Arc<ScriptedStore>,
    pub(crate) publisher: Arc<ScriptedPublisher>,
    pub(crate) world_state: Arc<MemoryWorldState>,
    config: PipelineConfig,
    fees: Arc<FeeCalculator>,
    bridges: Arc<BridgeResolver>,
    creator: Arc<RollupCreator>,
}

impl Fixture {
    pub(crate) fn new(inner: usize, outer: usize, publish_interval: Duration) -> Self {
        let config = PipelineConfig {
            publish_interval,
            inner_rollup_size: inner,
            outer_rollup_size: outer,
            exit_only: false,
        };
        let fee_config = FeeConfig {
            verification_gas: 0,
            gas_per_type: [0; TxType::COUNT],
            call_data_per_type: [0; TxType::COUNT],
            asset_gas_overhead: HashMap::new(),
            fee_multiplier_bps: 10_000,
            max_fee_gas_price: None,
            num_significant_figures: 0,
            max_rollup_call_data: u64::MAX,
            max_rollup_gas: u64::MAX,
        };
        let fees = Arc::new(FeeCalculator::new(
            fee_config,
            Arc::new(UnitOracle),
            inner * outer,
        ));
        let bridges = Arc::new(BridgeResolver::new(
            vec![BridgeConfig {
                bridge_address_id: 1,
                permitted_assets: vec![AssetId(0)],
                gas: Some(500_000),
                num_txs: 5,
            }],
            Arc::new(NoContract),
            Arc::new(NoSubsidies),
        ));
        let world_state = Arc::new(MemoryWorldState::new());
        let creator = Arc::new(RollupCreator::new(
            world_state.clone(),
            Arc::new(FixedProofService),
            inner,
            outer,
        ));

        Self {
            store: Arc::new(ScriptedStore::default()),
            publisher: Arc::new(ScriptedPublisher::default()),
            world_state,
            config,
            fees,
            bridges,
            creator,
        }
    }

    pub(crate) fn coordinator(&self) -> Arc<PipelineCoordinator> {
        Arc::new(PipelineCoordinator::new(
            self.config.clone(),
            self.store.clone(),
            self.publisher.clone(),
            self.world_state.clone(),
            self.creator.clone(),
            self.fees.clone(),
            self.bridges.clone(),
        ))
    }
}

/// Polls the condition until it holds or a generous timeout elapses.
pub(crate) async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}
