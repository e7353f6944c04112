//! Asset identifiers.

use std::fmt;

/// Asset ids at or above this value are "virtual": they carry bridge-local
/// meaning and are excluded from bridge configuration validation.
pub const VIRTUAL_ASSET_ID_FLAG: u32 = 1 << 29;

/// Identifier of an asset supported by the rollup.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

impl AssetId {
    /// The base fee asset (asset 0).
    pub const ETH: Self = Self(0);

    pub fn is_virtual(&self) -> bool {
        self.0 >= VIRTUAL_ASSET_ID_FLAG
    }
}

impl From<u32> for AssetId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}
