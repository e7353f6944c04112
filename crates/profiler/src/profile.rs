//! Profile types produced by [`crate::profile_rollup`].

use tessera_primitives::{BridgeCallData, TxType};

/// Gas accrual for one bridge interaction within a batch.
#[derive(Clone, Debug)]
pub struct BridgeProfile {
    pub call_data: BridgeCallData,
    /// Gas contributed by transactions towards this interaction, capped at
    /// [`Self::gas_threshold`].
    pub gas_accrued: u64,
    /// Full (un-subsidized) cost of the interaction.
    pub gas_threshold: u64,
    /// Externally funded credit counted towards the rollup balance.
    pub subsidy_gas: u64,
    /// Creation time of the earliest transaction referencing this bridge,
    /// unix milliseconds.
    pub earliest_tx: u64,
    /// Creation time of the latest such transaction.
    pub latest_tx: u64,
}

/// Ephemeral profitability profile of an ordered candidate batch.
#[derive(Clone, Debug, Default)]
pub struct RollupProfile {
    pub total_txs: usize,
    /// Per-kind counts, indexed by [`TxType::index`].
    pub tx_counts: [usize; TxType::COUNT],
    pub second_class_txs: usize,
    /// Unadjusted gas the rollup consumes, including full bridge costs.
    pub total_gas: u64,
    /// Call data the rollup consumes.
    pub total_call_data: u64,
    /// Net profitability. Non-negative means publishable.
    pub gas_balance: i128,
    pub bridge_profiles: Vec<BridgeProfile>,
    /// Backward links resolving within the same inner rollup.
    pub inner_chains: usize,
    /// Backward links resolving in an earlier inner rollup of the batch.
    pub outer_chains: usize,
    /// Creation time of the oldest transaction, unix milliseconds.
    pub earliest_tx: Option<u64>,
    pub latest_tx: Option<u64>,
}

impl RollupProfile {
    /// The central economic invariant of the scheduler.
    pub fn is_publishable(&self) -> bool {
        self.gas_balance >= 0
    }
}
