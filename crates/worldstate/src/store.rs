//! The world-state storage abstraction.

use async_trait::async_trait;
use tessera_primitives::Bytes32;

use crate::{
    error::WorldStateResult,
    tree::{HashPath, WorldStateTree},
};

/// Backing store for the world-state Merkle trees.
///
/// Writes accumulate in an uncommitted overlay: [`Self::commit`] makes
/// them durable, [`Self::rollback`] discards everything back to the last
/// commit. Reads always observe uncommitted writes.
#[async_trait]
pub trait WorldStateStore: Send + Sync {
    /// The leaf at `index`. Absent leaves read as zero.
    async fn get(&self, tree: WorldStateTree, index: u64) -> WorldStateResult<Bytes32>;

    /// Writes the leaf at `index` and returns the resulting tree root.
    async fn put(&self, tree: WorldStateTree, index: u64, value: Bytes32)
        -> WorldStateResult<Bytes32>;

    /// Sibling path proving membership of the leaf at `index`.
    async fn hash_path(&self, tree: WorldStateTree, index: u64) -> WorldStateResult<HashPath>;

    async fn root(&self, tree: WorldStateTree) -> WorldStateResult<Bytes32>;

    /// Number of leaves, i.e. one past the highest written index.
    async fn size(&self, tree: WorldStateTree) -> WorldStateResult<u64>;

    async fn commit(&self) -> WorldStateResult<()>;

    async fn rollback(&self) -> WorldStateResult<()>;
}
