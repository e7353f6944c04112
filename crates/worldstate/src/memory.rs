//! In-memory world state backed by sparse Merkle trees.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tessera_primitives::Bytes32;

use crate::{
    error::{WorldStateError, WorldStateResult},
    store::WorldStateStore,
    tree::{HashPath, WorldStateTree},
};

/// Depth of the data, root and DeFi interaction trees. Capacity is
/// `2^DEPTH` leaves.
pub const DATA_TREE_DEPTH: usize = 32;

/// Depth of the nullifier tree. Nullifiers index the tree by their own
/// value, so the tree must cover the full u64 index domain.
pub const NULLIFIER_TREE_DEPTH: usize = 64;

const fn tree_depth(tree: WorldStateTree) -> usize {
    match tree {
        WorldStateTree::Nullifier => NULLIFIER_TREE_DEPTH,
        _ => DATA_TREE_DEPTH,
    }
}

fn hash_pair(left: &Bytes32, right: &Bytes32) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Bytes32::new(hasher.finalize().into())
}

/// One sparse tree: only written leaves are stored, every other subtree
/// hashes to the precomputed zero hash of its level.
#[derive(Clone, Debug, Default)]
struct TreeState {
    leaves: BTreeMap<u64, Bytes32>,
    size: u64,
}

#[derive(Clone, Debug, Default)]
struct Trees([TreeState; WorldStateTree::COUNT]);

impl Trees {
    fn tree(&self, tree: WorldStateTree) -> &TreeState {
        &self.0[tree.index()]
    }

    fn tree_mut(&mut self, tree: WorldStateTree) -> &mut TreeState {
        &mut self.0[tree.index()]
    }
}

struct Inner {
    working: Trees,
    committed: Trees,
}

/// In-memory [`WorldStateStore`] suitable for tests and local pipelines.
pub struct MemoryWorldState {
    inner: Mutex<Inner>,
    /// `zero_hashes[l]` is the hash of an empty subtree of height `l`.
    zero_hashes: [Bytes32; NULLIFIER_TREE_DEPTH + 1],
}

impl MemoryWorldState {
    pub fn new() -> Self {
        let mut zero_hashes = [Bytes32::ZERO; NULLIFIER_TREE_DEPTH + 1];
        for level in 1..=NULLIFIER_TREE_DEPTH {
            zero_hashes[level] = hash_pair(&zero_hashes[level - 1], &zero_hashes[level - 1]);
        }
        Self {
            inner: Mutex::new(Inner {
                working: Trees::default(),
                committed: Trees::default(),
            }),
            zero_hashes,
        }
    }

    fn check_index(tree: WorldStateTree, index: u64) -> WorldStateResult<()> {
        let depth = tree_depth(tree);
        if depth < u64::BITS as usize && index >= 1u64 << depth {
            return Err(WorldStateError::IndexOutOfRange {
                index,
                capacity: 1u64 << depth,
            });
        }
        Ok(())
    }

    /// Hash of the subtree of height `level` whose leftmost leaf is
    /// `index << level`. Ranges are widened to u128 so a depth-64 tree
    /// can address its full span.
    fn node(&self, state: &TreeState, level: usize, index: u64) -> Bytes32 {
        if level == 0 {
            return state.leaves.get(&index).copied().unwrap_or(Bytes32::ZERO);
        }
        let start = (index as u128) << level;
        let last = (start + (1u128 << level) - 1) as u64;
        if state.leaves.range(start as u64..=last).next().is_none() {
            return self.zero_hashes[level];
        }
        let left = self.node(state, level - 1, index * 2);
        let right = self.node(state, level - 1, index * 2 + 1);
        hash_pair(&left, &right)
    }

    fn path(&self, state: &TreeState, depth: usize, index: u64) -> HashPath {
        let mut pairs = Vec::with_capacity(depth);
        for level in 0..depth {
            let base = (index >> level) & !1u64;
            pairs.push((
                self.node(state, level, base),
                self.node(state, level, base + 1),
            ));
        }
        HashPath(pairs)
    }
}

impl Default for MemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWorldState").finish_non_exhaustive()
    }
}

#[async_trait]
impl WorldStateStore for MemoryWorldState {
    async fn get(&self, tree: WorldStateTree, index: u64) -> WorldStateResult<Bytes32> {
        let inner = self.inner.lock();
        Ok(inner
            .working
            .tree(tree)
            .leaves
            .get(&index)
            .copied()
            .unwrap_or(Bytes32::ZERO))
    }

    async fn put(
        &self,
        tree: WorldStateTree,
        index: u64,
        value: Bytes32,
    ) -> WorldStateResult<Bytes32> {
        Self::check_index(tree, index)?;
        let mut inner = self.inner.lock();
        let state = inner.working.tree_mut(tree);
        state.leaves.insert(index, value);
        state.size = state.size.max(index.saturating_add(1));
        Ok(self.node(inner.working.tree(tree), tree_depth(tree), 0))
    }

    async fn hash_path(&self, tree: WorldStateTree, index: u64) -> WorldStateResult<HashPath> {
        Self::check_index(tree, index)?;
        let inner = self.inner.lock();
        Ok(self.path(inner.working.tree(tree), tree_depth(tree), index))
    }

    async fn root(&self, tree: WorldStateTree) -> WorldStateResult<Bytes32> {
        let inner = self.inner.lock();
        Ok(self.node(inner.working.tree(tree), tree_depth(tree), 0))
    }

    async fn size(&self, tree: WorldStateTree) -> WorldStateResult<u64> {
        let inner = self.inner.lock();
        Ok(inner.working.tree(tree).size)
    }

    async fn commit(&self) -> WorldStateResult<()> {
        let mut inner = self.inner.lock();
        inner.committed = inner.working.clone();
        Ok(())
    }

    async fn rollback(&self) -> WorldStateResult<()> {
        let mut inner = self.inner.lock();
        inner.working = inner.committed.clone();
        Ok(())
    }
}
