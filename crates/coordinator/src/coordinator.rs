//! The publish-scheduling state machine.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use tessera_bridge::BridgeResolver;
use tessera_creator::RollupCreator;
use tessera_fees::{FeeCalculator, TxFeeAllocator};
use tessera_primitives::{AssetId, TxDao, TxType};
use tessera_profiler::profile_rollup;
use tessera_worldstate::WorldStateStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::PipelineConfig,
    error::{PipelineError, PipelineResult},
    traits::{RollupPayload, RollupPublisher, RollupStore},
};

/// Lifecycle of one pipeline instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Stopped,
    /// Accepting new batches.
    Running,
    /// Draining; no new batches are started.
    Stopping,
}

#[derive(Debug)]
struct RunState {
    state: PipelineState,
    /// Whether a publish succeeded during the current run.
    has_published: bool,
}

enum Cycle {
    Published,
    Idle(Duration),
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Orchestrates the build/publish loop: pulls pending transactions,
/// selects the largest profitable batch, drives the creator per inner
/// rollup, and hands the aggregate to the publisher.
///
/// Single-flow: one cycle at a time, enforced by the run-state guard.
pub struct PipelineCoordinator {
    config: PipelineConfig,
    store: Arc<dyn RollupStore>,
    publisher: Arc<dyn RollupPublisher>,
    world_state: Arc<dyn WorldStateStore>,
    creator: Arc<RollupCreator>,
    fees: Arc<FeeCalculator>,
    bridges: Arc<BridgeResolver>,
    allocator: TxFeeAllocator,
    run_state: Mutex<RunState>,
    state_tx: watch::Sender<PipelineState>,
    state_rx: watch::Receiver<PipelineState>,
}

impl std::fmt::Debug for PipelineCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PipelineCoordinator {
    #[expect(clippy::too_many_arguments, reason = "wired once at construction")]
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn RollupStore>,
        publisher: Arc<dyn RollupPublisher>,
        world_state: Arc<dyn WorldStateStore>,
        creator: Arc<RollupCreator>,
        fees: Arc<FeeCalculator>,
        bridges: Arc<BridgeResolver>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(PipelineState::Stopped);
        let allocator = TxFeeAllocator::new(fees.clone(), bridges.clone());
        Self {
            config,
            store,
            publisher,
            world_state,
            creator,
            fees,
            bridges,
            allocator,
            run_state: Mutex::new(RunState {
                state: PipelineState::Stopped,
                has_published: false,
            }),
            state_tx,
            state_rx,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.run_state.lock().state
    }

    /// Runs the pipeline until [`Self::stop`] is called. Errors if a run
    /// is already active.
    pub async fn start(&self) -> PipelineResult<()> {
        {
            let mut run = self.run_state.lock();
            if run.state != PipelineState::Stopped {
                return Err(PipelineError::AlreadyRunning);
            }
            run.state = PipelineState::Running;
            run.has_published = false;
        }
        self.creator.clear_interrupt();
        let _ = self.state_tx.send(PipelineState::Running);
        info!("rollup pipeline started");

        while self.run_state.lock().state == PipelineState::Running {
            match self.run_cycle().await {
                Ok(Cycle::Published) => {}
                Ok(Cycle::Idle(wait)) => self.idle_sleep(wait).await,
                Err(err) if err.is_interruption() => {
                    debug!("build interrupted, draining");
                    self.try_rollback().await;
                    break;
                }
                Err(err) => {
                    warn!(%err, "pipeline cycle failed, retrying next cycle");
                    self.try_rollback().await;
                    self.idle_sleep(self.config.publish_interval).await;
                }
            }
        }

        self.run_state.lock().state = PipelineState::Stopped;
        let _ = self.state_tx.send(PipelineState::Stopped);
        info!("rollup pipeline stopped");
        Ok(())
    }

    /// Transitions to stopping, interrupts the creator, and awaits drain.
    ///
    /// With `throw_on_error`, errors if a publish had already succeeded in
    /// the interrupted run.
    pub async fn stop(&self, throw_on_error: bool) -> PipelineResult<()> {
        {
            let mut run = self.run_state.lock();
            match run.state {
                PipelineState::Stopped => return Ok(()),
                PipelineState::Running => run.state = PipelineState::Stopping,
                PipelineState::Stopping => {}
            }
        }
        self.creator.interrupt();
        let _ = self.state_tx.send(PipelineState::Stopping);

        let mut state_rx = self.state_rx.clone();
        while *state_rx.borrow_and_update() != PipelineState::Stopped {
            if state_rx.changed().await.is_err() {
                break;
            }
        }

        if throw_on_error && self.run_state.lock().has_published {
            return Err(PipelineError::StoppedAfterPublish);
        }
        Ok(())
    }

    /// Deadline of the oldest pending batch. Pure query, no state change.
    pub async fn next_publish_time(&self) -> PipelineResult<Option<u64>> {
        let txs = self.store.pending_txs(1).await?;
        Ok(txs
            .first()
            .map(|tx| tx.created + self.config.publish_interval.as_millis() as u64))
    }

    async fn run_cycle(&self) -> PipelineResult<Cycle> {
        let capacity = self.config.capacity();
        let mut txs = self.store.pending_txs(capacity).await?;
        if txs.len() < capacity {
            let second = self
                .store
                .pending_second_class_txs(capacity - txs.len())
                .await?;
            txs.extend(second);
        }
        if txs.is_empty() {
            return Ok(Cycle::Idle(self.config.publish_interval));
        }

        let at_capacity = txs.len() >= capacity;
        let oldest = txs.iter().map(|tx| tx.created).min().unwrap_or(0);
        let deadline = oldest + self.config.publish_interval.as_millis() as u64;
        let now = now_ms();
        if !at_capacity && now < deadline {
            return Ok(Cycle::Idle(Duration::from_millis(deadline - now)));
        }

        match self.select_batch(&txs).await? {
            Some((batch, fee_asset)) => self.build_and_publish(batch, fee_asset).await,
            None => Ok(Cycle::Idle(self.config.publish_interval)),
        }
    }

    /// The largest admissible prefix of the pending queue: validated by
    /// the allocator and profitable per the profiler. Prefixes only;
    /// within a batch the pending order must not change.
    async fn select_batch(
        &self,
        txs: &[TxDao],
    ) -> PipelineResult<Option<(Vec<TxDao>, Option<AssetId>)>> {
        for n in (1..=txs.len()).rev() {
            let mut candidate = txs[..n].to_vec();
            if let Err(err) = self
                .allocator
                .reallocate_gas(&mut candidate, self.config.exit_only)
                .await
            {
                debug!(%err, txs = n, "candidate prefix rejected");
                continue;
            }
            let fee_asset = self
                .allocator
                .validate_received_txs(&candidate, self.config.exit_only)?;

            let profile = profile_rollup(
                &candidate,
                &self.fees,
                &self.bridges,
                self.config.inner_rollup_size,
                self.config.outer_rollup_size,
            )
            .await?;
            if profile.is_publishable() {
                debug!(
                    txs = n,
                    gas_balance = profile.gas_balance,
                    "selected publishable batch"
                );
                return Ok(Some((candidate, fee_asset)));
            }
        }
        Ok(None)
    }

    async fn build_and_publish(
        &self,
        batch: Vec<TxDao>,
        fee_asset: Option<AssetId>,
    ) -> PipelineResult<Cycle> {
        let rollup_id = self.store.next_rollup_id().await?;

        let mut bridge_call_datas = Vec::new();
        for tx in &batch {
            if tx.tx_type != TxType::DefiDeposit {
                continue;
            }
            if let Some(call_data) = &tx.bridge_call_data {
                if !bridge_call_datas.contains(call_data) {
                    bridge_call_datas.push(call_data.clone());
                }
            }
        }
        let asset_ids: Vec<AssetId> = fee_asset.into_iter().collect();

        let mut proofs = Vec::new();
        for (i, chunk) in batch.chunks(self.config.inner_rollup_size).enumerate() {
            let request = self
                .creator
                .create_rollup(
                    rollup_id,
                    chunk,
                    bridge_call_datas.clone(),
                    asset_ids.clone(),
                    i == 0,
                )
                .await?;
            let proof = self.creator.create(chunk, &request).await?;
            proofs.push(proof);
        }
        self.store.add_rollup_proofs(&proofs).await?;

        let payload = RollupPayload {
            rollup_id,
            proofs,
            bridge_call_datas,
            asset_ids,
            tx_ids: batch.iter().map(|tx| tx.id).collect(),
        };

        if self.publisher.publish(&payload).await? {
            self.world_state.commit().await?;
            self.store.confirm_sent(rollup_id, &payload.tx_ids).await?;
            self.run_state.lock().has_published = true;
            info!(rollup_id, txs = payload.tx_ids.len(), "rollup published");
            Ok(Cycle::Published)
        } else {
            self.world_state.rollback().await?;
            warn!(rollup_id, "publish failed, will retry next cycle");
            Ok(Cycle::Idle(self.config.publish_interval))
        }
    }

    async fn try_rollback(&self) {
        if let Err(err) = self.world_state.rollback().await {
            warn!(%err, "world state rollback failed");
        }
    }

    /// Sleeps until the wait elapses or the run state leaves `Running`.
    ///
    /// The state check and the wait are tied to the same watch channel,
    /// so a stop issued while a cycle is still in flight is observed the
    /// moment the loop reaches this sleep rather than a change
    /// notification being consumed and lost.
    async fn idle_sleep(&self, wait: Duration) {
        let mut state_rx = self.state_rx.clone();
        if *state_rx.borrow_and_update() != PipelineState::Running {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = state_rx.changed() => {}
        }
    }
}
