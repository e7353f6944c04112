//! The external proof generator interface and its request/response types.

use async_trait::async_trait;
use tessera_primitives::{AssetId, BridgeCallData, Bytes32, TxId};
use tessera_worldstate::HashPath;

use crate::error::CreatorResult;

/// Everything the proving system needs to build one inner rollup proof.
///
/// Nullifier roots and paths come in insertion order, two entries per
/// transaction slot (padded slots included).
#[derive(Clone, Debug)]
pub struct InnerRollupRequest {
    pub rollup_id: u64,
    /// First data-tree slot consumed by this inner rollup.
    pub data_start_index: u64,
    /// Ordered proof blobs of the included transactions.
    pub proofs: Vec<Vec<u8>>,
    pub old_data_root: Bytes32,
    pub new_data_root: Bytes32,
    pub old_data_path: HashPath,
    pub new_data_path: HashPath,
    pub old_null_roots: Vec<Bytes32>,
    pub new_null_roots: Vec<Bytes32>,
    pub old_null_paths: Vec<HashPath>,
    pub new_null_paths: Vec<HashPath>,
    pub data_roots_root: Bytes32,
    /// Membership path of each transaction's declared historical data
    /// root, one per slot.
    pub data_roots_paths: Vec<HashPath>,
    pub data_roots_indices: Vec<u64>,
    /// Authentication path of each transaction's backward-link target.
    /// Empty placeholder when the link resolves in-batch or not at all.
    pub linked_commitment_paths: Vec<HashPath>,
    pub linked_commitment_indices: Vec<u64>,
    /// Bridge interactions touched by this rollup, in nonce order.
    pub bridge_call_datas: Vec<BridgeCallData>,
    /// Fee-paying assets touched by this rollup.
    pub asset_ids: Vec<AssetId>,
}

/// An inner rollup proof as returned by the proving system.
#[derive(Clone, Debug)]
pub struct RollupProof {
    pub rollup_id: u64,
    pub proof_data: Vec<u8>,
    pub tx_ids: Vec<TxId>,
}

/// Opaque asynchronous proof generator.
#[async_trait]
pub trait ProofService: Send + Sync {
    /// Builds the proof, or rejects the request.
    async fn create_proof(&self, request: &InnerRollupRequest) -> CreatorResult<Vec<u8>>;

    /// Aborts outstanding work without corrupting subsequent requests.
    fn interrupt(&self);
}
