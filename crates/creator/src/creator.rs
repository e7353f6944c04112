//! Batch assembly against the world state.

use std::{collections::HashMap, sync::Arc};

use sha2::{Digest, Sha256};
use tessera_primitives::{AssetId, BridgeCallData, Bytes32, TxDao, TxType};
use tessera_worldstate::{HashPath, WorldStateStore, WorldStateTree};
use tracing::debug;

use crate::{
    error::{CreatorError, CreatorResult},
    interrupt::InterruptFlag,
    proof_service::{InnerRollupRequest, ProofService, RollupProof},
};

/// Upper bound on distinct bridge interactions per outer rollup; the
/// claim-note nonce space is partitioned by it.
pub const MAX_BRIDGE_CALLS_PER_ROLLUP: u64 = 32;

/// Assembles inner rollups: inserts commitments and nullifiers into the
/// world state, resolves backward links, and submits proof requests.
///
/// The store is exclusively owned by the creator for the duration of one
/// [`RollupCreator::create_rollup`] call. Writes are not rolled back here;
/// the store's own commit/rollback discipline is the consistency boundary,
/// so an interrupted batch leaves the store recoverable via rollback.
pub struct RollupCreator {
    store: Arc<dyn WorldStateStore>,
    proof_service: Arc<dyn ProofService>,
    inner_size: usize,
    outer_size: usize,
    interrupt: Arc<InterruptFlag>,
}

impl std::fmt::Debug for RollupCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollupCreator")
            .field("inner_size", &self.inner_size)
            .field("outer_size", &self.outer_size)
            .finish_non_exhaustive()
    }
}

impl RollupCreator {
    pub fn new(
        store: Arc<dyn WorldStateStore>,
        proof_service: Arc<dyn ProofService>,
        inner_size: usize,
        outer_size: usize,
    ) -> Self {
        Self {
            store,
            proof_service,
            inner_size,
            outer_size,
            interrupt: Arc::new(InterruptFlag::new()),
        }
    }

    /// Signals cooperative abort to the in-flight batch and the proof
    /// service.
    pub fn interrupt(&self) {
        self.interrupt.interrupt();
        self.proof_service.interrupt();
    }

    /// Re-arms the creator after an interrupted run.
    pub fn clear_interrupt(&self) {
        self.interrupt.clear();
    }

    fn checkpoint(&self) -> CreatorResult<()> {
        if self.interrupt.is_interrupted() {
            return Err(CreatorError::Interrupted);
        }
        Ok(())
    }

    /// Inserts the batch into the world state and assembles the proof
    /// request for one inner rollup.
    ///
    /// `bridge_call_datas` and `asset_ids` are the outer rollup's bridge
    /// and fee-asset lists; every DeFi deposit in `txs` must reference a
    /// listed bridge. `first_inner` aligns the insertion start to the
    /// outer-rollup subtree boundary instead of the inner one.
    #[tracing::instrument(skip(self, txs, bridge_call_datas, asset_ids), fields(txs = txs.len()))]
    pub async fn create_rollup(
        &self,
        rollup_id: u64,
        txs: &[TxDao],
        bridge_call_datas: Vec<BridgeCallData>,
        asset_ids: Vec<AssetId>,
        first_inner: bool,
    ) -> CreatorResult<InnerRollupRequest> {
        if txs.len() > self.inner_size {
            return Err(CreatorError::BatchTooLarge {
                len: txs.len(),
                capacity: self.inner_size,
            });
        }
        self.checkpoint()?;

        // Two data-tree slots per transaction slot.
        let slots_per_inner = (self.inner_size * 2) as u64;
        let boundary = if first_inner {
            slots_per_inner * self.outer_size as u64
        } else {
            slots_per_inner
        };
        let data_size = self.store.size(WorldStateTree::Data).await?;
        let start = data_size.div_ceil(boundary) * boundary;

        let old_data_root = self.store.root(WorldStateTree::Data).await?;
        let old_data_path = self.store.hash_path(WorldStateTree::Data, start).await?;

        // Backward links resolve against the tree as it stood before this
        // batch, so compute them before any insertion.
        let (linked_commitment_paths, linked_commitment_indices) =
            self.linked_commitments(txs, data_size).await?;

        let data_roots_root = self.store.root(WorldStateTree::Root).await?;
        let latest_root_index = self
            .store
            .size(WorldStateTree::Root)
            .await?
            .saturating_sub(1);

        let mut request = InnerRollupRequest {
            rollup_id,
            data_start_index: start,
            proofs: Vec::with_capacity(txs.len()),
            old_data_root,
            new_data_root: old_data_root,
            old_data_path,
            new_data_path: HashPath::empty(),
            old_null_roots: Vec::new(),
            new_null_roots: Vec::new(),
            old_null_paths: Vec::new(),
            new_null_paths: Vec::new(),
            data_roots_root,
            data_roots_paths: Vec::new(),
            data_roots_indices: Vec::new(),
            linked_commitment_paths,
            linked_commitment_indices,
            bridge_call_datas,
            asset_ids,
        };

        for (pos, tx) in txs.iter().enumerate() {
            self.checkpoint()?;
            let proof = tx.proof()?;

            let commitment_2 = if tx.tx_type == TxType::DefiDeposit {
                self.claim_note_commitment(rollup_id, tx, &proof.note_commitment_2, &request)?
            } else {
                proof.note_commitment_2
            };

            let slot = start + pos as u64 * 2;
            self.store
                .put(WorldStateTree::Data, slot, proof.note_commitment_1)
                .await?;
            self.store
                .put(WorldStateTree::Data, slot + 1, commitment_2)
                .await?;

            for nullifier in [proof.nullifier_1, proof.nullifier_2] {
                self.insert_nullifier(&mut request, nullifier).await?;
            }

            let path = self
                .store
                .hash_path(WorldStateTree::Root, latest_root_index)
                .await?;
            request.data_roots_paths.push(path);
            request.data_roots_indices.push(latest_root_index);

            request.proofs.push(tx.proof_data.clone());
        }

        self.pad_batch(&mut request, txs.len(), start, latest_root_index)
            .await?;

        request.new_data_root = self.store.root(WorldStateTree::Data).await?;
        request.new_data_path = self.store.hash_path(WorldStateTree::Data, start).await?;

        debug!(
            rollup_id,
            start,
            txs = txs.len(),
            "assembled inner rollup request"
        );
        Ok(request)
    }

    /// Submits the assembled request to the proof service.
    pub async fn create(
        &self,
        txs: &[TxDao],
        request: &InnerRollupRequest,
    ) -> CreatorResult<RollupProof> {
        self.checkpoint()?;
        let proof_data = self.proof_service.create_proof(request).await?;
        Ok(RollupProof {
            rollup_id: request.rollup_id,
            proof_data,
            tx_ids: txs.iter().map(|tx| tx.id).collect(),
        })
    }

    /// Synthesized partial claim-note commitment standing in for a DeFi
    /// deposit's second output until the interaction settles.
    ///
    /// The interaction nonce is deterministic: the rollup id partitions
    /// the nonce space and the bridge's position within the outer rollup
    /// selects within it. Half the fee is reserved to pay for the eventual
    /// claim.
    fn claim_note_commitment(
        &self,
        rollup_id: u64,
        tx: &TxDao,
        partial_commitment: &Bytes32,
        request: &InnerRollupRequest,
    ) -> CreatorResult<Bytes32> {
        let call_data = tx
            .bridge_call_data
            .as_ref()
            .ok_or(CreatorError::UnlistedBridgeCallData(tx.id))?;
        let bridge_position = request
            .bridge_call_datas
            .iter()
            .position(|cd| cd == call_data)
            .ok_or(CreatorError::UnlistedBridgeCallData(tx.id))? as u64;

        let nonce = rollup_id * MAX_BRIDGE_CALLS_PER_ROLLUP + bridge_position;
        let claim_fee = tx.fee()? / 2;

        let mut hasher = Sha256::new();
        hasher.update(partial_commitment.as_bytes());
        hasher.update(nonce.to_be_bytes());
        hasher.update(claim_fee.to_be_bytes());
        Ok(Bytes32::new(hasher.finalize().into()))
    }

    /// Records pre/post nullifier-tree state for one nullifier. The
    /// reserved zero value skips insertion but still occupies its slot in
    /// the request.
    async fn insert_nullifier(
        &self,
        request: &mut InnerRollupRequest,
        nullifier: Bytes32,
    ) -> CreatorResult<()> {
        let index = nullifier.low_u64();
        let old_root = self.store.root(WorldStateTree::Nullifier).await?;
        let old_path = self.store.hash_path(WorldStateTree::Nullifier, index).await?;
        request.old_null_roots.push(old_root);
        request.old_null_paths.push(old_path);

        let new_root = if nullifier.is_zero() {
            old_root
        } else {
            self.store
                .put(WorldStateTree::Nullifier, index, nullifier)
                .await?
        };
        let new_path = self.store.hash_path(WorldStateTree::Nullifier, index).await?;
        request.new_null_roots.push(new_root);
        request.new_null_paths.push(new_path);
        Ok(())
    }

    /// Pads a short batch to the inner capacity: a zero leaf claims the
    /// final data-tree slot and the zero-nullifier path fills the per-slot
    /// vectors.
    async fn pad_batch(
        &self,
        request: &mut InnerRollupRequest,
        txs: usize,
        start: u64,
        latest_root_index: u64,
    ) -> CreatorResult<()> {
        if txs == self.inner_size {
            return Ok(());
        }

        let last_slot = start + (self.inner_size * 2) as u64 - 1;
        self.store
            .put(WorldStateTree::Data, last_slot, Bytes32::ZERO)
            .await?;

        let null_root = self.store.root(WorldStateTree::Nullifier).await?;
        let zero_path = self.store.hash_path(WorldStateTree::Nullifier, 0).await?;
        let root_path = self
            .store
            .hash_path(WorldStateTree::Root, latest_root_index)
            .await?;
        for _ in txs..self.inner_size {
            for _ in 0..2 {
                request.old_null_roots.push(null_root);
                request.new_null_roots.push(null_root);
                request.old_null_paths.push(zero_path.clone());
                request.new_null_paths.push(zero_path.clone());
            }
            request.data_roots_paths.push(root_path.clone());
            request.data_roots_indices.push(latest_root_index);
        }
        Ok(())
    }

    /// Resolves each transaction's backward link to an authentication path
    /// in the committed data tree.
    ///
    /// A link satisfied by an earlier commitment within this same batch
    /// needs no path; otherwise the tree is scanned backwards from the
    /// insertion point, caching every value seen so the whole batch incurs
    /// at most one full scan. An unlocatable target falls back to an empty
    /// placeholder path: the proof will be rejected downstream.
    async fn linked_commitments(
        &self,
        txs: &[TxDao],
        data_size: u64,
    ) -> CreatorResult<(Vec<HashPath>, Vec<u64>)> {
        let mut paths = Vec::with_capacity(txs.len());
        let mut indices = Vec::with_capacity(txs.len());

        let mut batch_commitments: Vec<Bytes32> = Vec::new();
        let mut scanned: HashMap<Bytes32, u64> = HashMap::new();
        // Next unscanned index, descending. None once exhausted.
        let mut cursor = data_size.checked_sub(1);

        for tx in txs {
            let proof = tx.proof()?;
            let mut resolved = None;

            if let Some(link) = proof.backward_link() {
                if !batch_commitments.contains(&link) {
                    resolved = match scanned.get(&link) {
                        Some(index) => Some(*index),
                        None => self.scan_for(&mut scanned, &mut cursor, link).await?,
                    };
                }
            }

            match resolved {
                Some(index) => {
                    let path = self.store.hash_path(WorldStateTree::Data, index).await?;
                    paths.push(path);
                    indices.push(index);
                }
                None => {
                    paths.push(HashPath::empty());
                    indices.push(0);
                }
            }

            for commitment in [proof.note_commitment_1, proof.note_commitment_2] {
                if !commitment.is_zero() {
                    batch_commitments.push(commitment);
                }
            }
        }
        Ok((paths, indices))
    }

    async fn scan_for(
        &self,
        scanned: &mut HashMap<Bytes32, u64>,
        cursor: &mut Option<u64>,
        target: Bytes32,
    ) -> CreatorResult<Option<u64>> {
        while let Some(index) = *cursor {
            self.checkpoint()?;
            let value = self.store.get(WorldStateTree::Data, index).await?;
            *cursor = index.checked_sub(1);
            if !value.is_zero() {
                // First hit from the top wins, matching latest-insertion
                // precedence.
                scanned.entry(value).or_insert(index);
                if value == target {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }
}
