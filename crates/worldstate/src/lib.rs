//! World-state Merkle trees and their storage abstraction.
//!
//! The four trees (data, nullifier, root, DeFi interaction) are exposed
//! through the async [`WorldStateStore`] trait with commit/rollback
//! checkpointing. [`MemoryWorldState`] is the in-process implementation.

mod error;
mod memory;
mod store;
mod tree;

pub use error::{WorldStateError, WorldStateResult};
pub use memory::{MemoryWorldState, DATA_TREE_DEPTH, NULLIFIER_TREE_DEPTH};
pub use store::WorldStateStore;
pub use tree::{HashPath, WorldStateTree};
