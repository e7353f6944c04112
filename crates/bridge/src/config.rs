//! Static bridge configuration entries.

use tessera_primitives::{AssetId, BridgeCallData};

/// Operator-supplied configuration for one bridge.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub bridge_address_id: u32,
    /// Asset ids this bridge may take as inputs or produce as outputs.
    pub permitted_assets: Vec<AssetId>,
    /// Declared gas budget for a full bridge interaction. `None` falls
    /// back to an on-chain query.
    pub gas: Option<u64>,
    /// Number of transactions the budget is divided across.
    pub num_txs: u32,
}

impl BridgeConfig {
    /// Whether this entry matches the given call data. Auxiliary data and
    /// virtual asset ids are ignored.
    pub fn matches(&self, call_data: &BridgeCallData) -> bool {
        self.bridge_address_id == call_data.bridge_address_id
            && call_data
                .real_asset_ids()
                .all(|id| self.permitted_assets.contains(&id))
    }
}
