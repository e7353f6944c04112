//! Price inputs supplied by an external feed.

use tessera_primitives::AssetId;

/// Live price data consumed by the fee calculator. Implementations cache
/// externally sourced prices; reads are cheap and synchronous.
pub trait PriceOracle: Send + Sync {
    /// Current base-chain gas price, wei per gas.
    fn gas_price(&self) -> u128;

    /// Price of the asset's smallest unit in wei. May return zero when the
    /// asset is unknown to the feed.
    fn asset_price(&self, asset_id: AssetId) -> u128;
}
