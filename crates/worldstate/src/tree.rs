//! Tree identifiers and membership paths.

use tessera_primitives::Bytes32;

/// The four Merkle trees making up the world state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorldStateTree {
    /// Note commitments, append-ordered.
    Data,
    /// Spent-note nullifiers, indexed by nullifier value.
    Nullifier,
    /// Historical data roots, one leaf per published rollup.
    Root,
    /// DeFi interaction results.
    DefiInteraction,
}

impl WorldStateTree {
    pub const COUNT: usize = 4;

    pub const ALL: [WorldStateTree; Self::COUNT] = [
        WorldStateTree::Data,
        WorldStateTree::Nullifier,
        WorldStateTree::Root,
        WorldStateTree::DefiInteraction,
    ];

    pub fn index(self) -> usize {
        match self {
            WorldStateTree::Data => 0,
            WorldStateTree::Nullifier => 1,
            WorldStateTree::Root => 2,
            WorldStateTree::DefiInteraction => 3,
        }
    }
}

/// Sibling pairs from a leaf up to the root, bottom level first.
///
/// Each entry is the `(left, right)` node pair at that level on the path;
/// one of the two is always the path node itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashPath(pub Vec<(Bytes32, Bytes32)>);

impl HashPath {
    /// A placeholder path, used where a circuit input is required but the
    /// membership claim is vacuous.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
