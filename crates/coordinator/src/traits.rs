//! External persistence and publication interfaces.

use async_trait::async_trait;
use tessera_creator::RollupProof;
use tessera_primitives::{AssetId, BridgeCallData, TxDao, TxId};

use crate::error::PipelineResult;

/// The fully aggregated rollup handed to the publisher.
#[derive(Clone, Debug)]
pub struct RollupPayload {
    pub rollup_id: u64,
    /// Inner rollup proofs in creation order.
    pub proofs: Vec<RollupProof>,
    pub bridge_call_datas: Vec<BridgeCallData>,
    pub asset_ids: Vec<AssetId>,
    pub tx_ids: Vec<TxId>,
}

/// Pending-transaction and rollup persistence.
///
/// Writes are externally serialized; this core must not assume it is the
/// only caller.
#[async_trait]
pub trait RollupStore: Send + Sync {
    /// Pending first-class transactions, oldest first.
    async fn pending_txs(&self, take: usize) -> PipelineResult<Vec<TxDao>>;

    /// Pending second-class transactions, oldest first.
    async fn pending_second_class_txs(&self, take: usize) -> PipelineResult<Vec<TxDao>>;

    async fn next_rollup_id(&self) -> PipelineResult<u64>;

    async fn add_rollup_proofs(&self, proofs: &[RollupProof]) -> PipelineResult<()>;

    /// Marks the rollup's transactions as sent to the base chain.
    async fn confirm_sent(&self, rollup_id: u64, tx_ids: &[TxId]) -> PipelineResult<()>;

    /// Marks the rollup's transactions as mined on the base chain. Driven
    /// by the caller's chain watcher, not by the publish loop.
    async fn confirm_mined(&self, rollup_id: u64, tx_ids: &[TxId]) -> PipelineResult<()>;
}

/// Base-chain submission. A `false` return is a non-fatal failure; the
/// coordinator retries on its next cycle.
#[async_trait]
pub trait RollupPublisher: Send + Sync {
    async fn publish(&self, payload: &RollupPayload) -> PipelineResult<bool>;
}
