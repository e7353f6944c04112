//! External collaborators consulted during bridge resolution.

use async_trait::async_trait;
use ethnum::U256;

use crate::error::BridgeResult;

/// Externally funded gas credit applied to one bridge interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BridgeSubsidy {
    /// Gas credited towards the interaction's full cost.
    pub gas: u64,
}

/// On-chain bridge contract queries.
#[async_trait]
pub trait BridgeContract: Send + Sync {
    /// The full gas budget of a bridge interaction, as declared by the
    /// bridge contract itself.
    async fn full_bridge_gas(&self, bridge_address_id: u32) -> BridgeResult<u64>;
}

/// On-chain subsidy lookups, keyed by exact call-data value.
#[async_trait]
pub trait SubsidyProvider: Send + Sync {
    async fn bridge_subsidy(&self, call_data: U256) -> BridgeResult<Option<BridgeSubsidy>>;
}
