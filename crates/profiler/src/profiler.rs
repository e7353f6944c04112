//! Batch profiling.

use std::collections::HashMap;

use ethnum::U256;
use tessera_bridge::BridgeResolver;
use tessera_fees::FeeCalculator;
use tessera_primitives::{Bytes32, TxDao, TxType};
use tracing::trace;

use crate::{
    error::{ProfilerError, ProfilerResult},
    profile::{BridgeProfile, RollupProfile},
};

/// Profiles an ordered candidate batch against the given rollup sizes.
///
/// Transactions must be in inclusion order; backward-link classification
/// and bridge accrual depend on it. An unresolved backward link is ignored
/// (it may resolve against already-settled state outside the batch).
pub async fn profile_rollup(
    txs: &[TxDao],
    fees: &FeeCalculator,
    bridges: &BridgeResolver,
    inner_size: usize,
    outer_size: usize,
) -> ProfilerResult<RollupProfile> {
    let capacity = inner_size * outer_size;
    if txs.len() > capacity {
        return Err(ProfilerError::BatchTooLarge {
            len: txs.len(),
            capacity,
        });
    }

    let mut profile = RollupProfile {
        total_txs: txs.len(),
        ..Default::default()
    };

    // Commitment -> inner-rollup window it was introduced in.
    let mut commitment_windows: HashMap<Bytes32, usize> = HashMap::new();
    // Bridge call data -> index into profile.bridge_profiles.
    let mut bridge_index: HashMap<U256, usize> = HashMap::new();

    for (pos, tx) in txs.iter().enumerate() {
        let window = pos / inner_size;
        let proof = tx.proof()?;

        profile.tx_counts[tx.tx_type.index()] += 1;
        if tx.second_class {
            profile.second_class_txs += 1;
        }
        profile.earliest_tx = Some(profile.earliest_tx.map_or(tx.created, |t| t.min(tx.created)));
        profile.latest_tx = Some(profile.latest_tx.map_or(tx.created, |t| t.max(tx.created)));

        // Classify the backward link before introducing this transaction's
        // own commitments; a transaction cannot chain from itself.
        if let Some(link) = proof.backward_link() {
            match commitment_windows.get(&link) {
                Some(w) if *w == window => profile.inner_chains += 1,
                Some(_) => profile.outer_chains += 1,
                None => {} // May resolve against settled state; not an error.
            }
        }
        for commitment in [proof.note_commitment_1, proof.note_commitment_2] {
            if !commitment.is_zero() {
                commitment_windows.entry(commitment).or_insert(window);
            }
        }

        profile.total_gas += fees.unadjusted_tx_gas(tx.fee_asset_id, tx.tx_type);
        profile.total_call_data += fees.tx_call_data(tx.tx_type);
        profile.gas_balance +=
            i128::from(fees.tx_gas_adjustment(tx.fee_asset_id, tx.tx_type));

        if tx.tx_type == TxType::DefiDeposit {
            accrue_bridge_gas(&mut profile, &mut bridge_index, bridges, tx).await?;
        } else {
            profile.gas_balance += i128::from(tx.excess_gas);
        }
    }

    // Unused slots still pay their verifier share.
    let empty_slots = (capacity - txs.len()) as u64;
    profile.gas_balance -=
        i128::from(empty_slots * fees.unadjusted_base_verification_gas());

    trace!(
        txs = profile.total_txs,
        gas_balance = profile.gas_balance,
        inner_chains = profile.inner_chains,
        outer_chains = profile.outer_chains,
        "profiled rollup batch"
    );
    Ok(profile)
}

/// Applies one DeFi deposit to its bridge sub-profile and the rollup
/// balance.
///
/// The first transaction referencing a bridge charges the full
/// un-subsidized interaction cost to the balance and credits any subsidy.
/// Every referencing transaction then contributes its minimum bridge share
/// plus excess gas; the sub-profile accrual is capped at the full cost,
/// with overflow credited to the rollup instead.
async fn accrue_bridge_gas(
    profile: &mut RollupProfile,
    bridge_index: &mut HashMap<U256, usize>,
    bridges: &BridgeResolver,
    tx: &TxDao,
) -> ProfilerResult<()> {
    let call_data = tx
        .bridge_call_data
        .as_ref()
        .ok_or(ProfilerError::MissingBridgeCallData(tx.id))?;
    let key = call_data.encode();

    let idx = match bridge_index.get(&key) {
        Some(idx) => *idx,
        None => {
            let full_gas = bridges.full_bridge_gas(call_data).await?;
            let subsidy = bridges
                .bridge_subsidy(call_data)
                .await?
                .map(|s| s.gas.min(full_gas))
                .unwrap_or(0);

            profile.gas_balance -= i128::from(full_gas);
            profile.gas_balance += i128::from(subsidy);
            profile.total_gas += full_gas;

            profile.bridge_profiles.push(BridgeProfile {
                call_data: call_data.clone(),
                gas_accrued: 0,
                gas_threshold: full_gas,
                subsidy_gas: subsidy,
                earliest_tx: tx.created,
                latest_tx: tx.created,
            });
            let idx = profile.bridge_profiles.len() - 1;
            bridge_index.insert(key, idx);
            idx
        }
    };

    let contribution = bridges.min_bridge_tx_gas(call_data).await? + tx.excess_gas;
    let bridge_profile = &mut profile.bridge_profiles[idx];
    bridge_profile.gas_accrued =
        (bridge_profile.gas_accrued + contribution).min(bridge_profile.gas_threshold);
    bridge_profile.earliest_tx = bridge_profile.earliest_tx.min(tx.created);
    bridge_profile.latest_tx = bridge_profile.latest_tx.max(tx.created);

    // The rollup keeps the full contribution even past the bridge cap.
    profile.gas_balance += i128::from(contribution);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use async_trait::async_trait;
    use tessera_bridge::{
        BridgeConfig, BridgeContract, BridgeResult, BridgeSubsidy, SubsidyProvider,
    };
    use tessera_fees::{FeeConfig, PriceOracle};
    use tessera_primitives::{test_utils::TxDaoBuilder, AssetId, BridgeCallData};

    use super::*;

    struct UnitOracle;

    impl PriceOracle for UnitOracle {
        fn gas_price(&self) -> u128 {
            1
        }

        fn asset_price(&self, _asset_id: AssetId) -> u128 {
            1
        }
    }

    struct NoContract;

    #[async_trait]
    impl BridgeContract for NoContract {
        async fn full_bridge_gas(&self, bridge_address_id: u32) -> BridgeResult<u64> {
            Err(tessera_bridge::BridgeError::UnrecognizedBridge(
                bridge_address_id,
            ))
        }
    }

    struct FixedSubsidies(Option<BridgeSubsidy>);

    #[async_trait]
    impl SubsidyProvider for FixedSubsidies {
        async fn bridge_subsidy(&self, _call_data: U256) -> BridgeResult<Option<BridgeSubsidy>> {
            Ok(self.0)
        }
    }

    // Flat fee tables: adjusted == unadjusted, verifier share is
    // verification_gas / total_slots.
    fn fee_calculator(verification_gas: u64, total_slots: usize) -> FeeCalculator {
        let config = FeeConfig {
            verification_gas,
            gas_per_type: [0; TxType::COUNT],
            call_data_per_type: [0; TxType::COUNT],
            asset_gas_overhead: HashMap::new(),
            fee_multiplier_bps: 10_000,
            max_fee_gas_price: None,
            num_significant_figures: 0,
            max_rollup_call_data: u64::MAX,
            max_rollup_gas: u64::MAX,
        };
        FeeCalculator::new(config, Arc::new(UnitOracle), total_slots)
    }

    fn bridge_resolver(subsidy: Option<BridgeSubsidy>) -> BridgeResolver {
        BridgeResolver::new(
            vec![BridgeConfig {
                bridge_address_id: 1,
                permitted_assets: vec![AssetId(0)],
                gas: Some(500_000),
                num_txs: 5,
            }],
            Arc::new(NoContract),
            Arc::new(FixedSubsidies(subsidy)),
        )
    }

    fn bridge_call_data() -> BridgeCallData {
        BridgeCallData {
            bridge_address_id: 1,
            input_asset_id_a: AssetId(0),
            input_asset_id_b: None,
            output_asset_id_a: AssetId(0),
            output_asset_id_b: None,
            aux_data: 0,
        }
    }

    #[tokio::test]
    async fn full_rollup_of_transfers_balances_to_zero() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let txs = vec![
            TxDaoBuilder::new(1).fee(5_000).build(),
            TxDaoBuilder::new(2).fee(5_000).build(),
        ];

        let profile = profile_rollup(&txs, &fees, &bridges, 2, 1).await.unwrap();
        assert_eq!(profile.gas_balance, 0);
        assert!(profile.is_publishable());
        assert_eq!(profile.tx_counts[TxType::Transfer.index()], 2);
        assert_eq!(profile.total_gas, 10_000);
    }

    #[tokio::test]
    async fn empty_slots_charge_the_verifier_share() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let txs = vec![TxDaoBuilder::new(1).build()];

        let profile = profile_rollup(&txs, &fees, &bridges, 2, 1).await.unwrap();
        assert_eq!(profile.gas_balance, -5_000);
        assert!(!profile.is_publishable());
    }

    #[tokio::test]
    async fn excess_gas_of_non_defi_txs_credits_the_balance() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let mut tx = TxDaoBuilder::new(1).build();
        tx.excess_gas = 12_000;

        let profile = profile_rollup(&[tx], &fees, &bridges, 2, 1).await.unwrap();
        assert_eq!(profile.gas_balance, 12_000 - 5_000);
    }

    #[tokio::test]
    async fn lone_defi_deposit_is_not_publishable() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let tx = TxDaoBuilder::new(1)
            .tx_type(TxType::DefiDeposit)
            .bridge_call_data(bridge_call_data())
            .build();

        let profile = profile_rollup(&[tx], &fees, &bridges, 2, 1).await.unwrap();
        let bridge = &profile.bridge_profiles[0];
        assert_eq!(bridge.gas_accrued, 100_000);
        assert_eq!(bridge.gas_threshold, 500_000);
        // -(500_000 - 100_000) minus one empty slot.
        assert_eq!(profile.gas_balance, -(500_000 - 100_000) - 5_000);
        assert!(!profile.is_publishable());
    }

    #[tokio::test]
    async fn subsidy_credits_the_balance() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(Some(BridgeSubsidy { gas: 500_000 }));
        let tx = TxDaoBuilder::new(1)
            .tx_type(TxType::DefiDeposit)
            .bridge_call_data(bridge_call_data())
            .build();

        let profile = profile_rollup(&[tx], &fees, &bridges, 2, 1).await.unwrap();
        // Fully subsidized: only the empty slot weighs against the share.
        assert_eq!(profile.gas_balance, 100_000 - 5_000);
        assert!(profile.is_publishable());
        assert_eq!(profile.bridge_profiles[0].subsidy_gas, 500_000);
    }

    #[tokio::test]
    async fn bridge_accrual_caps_but_rollup_keeps_overflow() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let mut tx = TxDaoBuilder::new(1)
            .tx_type(TxType::DefiDeposit)
            .bridge_call_data(bridge_call_data())
            .build();
        tx.excess_gas = 450_000;

        let profile = profile_rollup(&[tx], &fees, &bridges, 2, 1).await.unwrap();
        // Contribution 550_000 caps at the 500_000 threshold...
        assert_eq!(profile.bridge_profiles[0].gas_accrued, 500_000);
        // ...but the balance is credited in full.
        assert_eq!(profile.gas_balance, -500_000 + 550_000 - 5_000);
    }

    #[tokio::test]
    async fn second_deposit_reuses_the_bridge_profile() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let txs = vec![
            TxDaoBuilder::new(1)
                .tx_type(TxType::DefiDeposit)
                .bridge_call_data(bridge_call_data())
                .created(5)
                .build(),
            TxDaoBuilder::new(2)
                .tx_type(TxType::DefiDeposit)
                .bridge_call_data(bridge_call_data())
                .created(9)
                .build(),
        ];

        let profile = profile_rollup(&txs, &fees, &bridges, 2, 1).await.unwrap();
        assert_eq!(profile.bridge_profiles.len(), 1);
        let bridge = &profile.bridge_profiles[0];
        assert_eq!(bridge.gas_accrued, 200_000);
        assert_eq!((bridge.earliest_tx, bridge.latest_tx), (5, 9));
        // Full cost charged once, two shares credited, no empty slots.
        assert_eq!(profile.gas_balance, -500_000 + 200_000);
    }

    #[tokio::test]
    async fn backward_links_classify_by_inner_window() {
        let fees = fee_calculator(10_000, 4);
        let bridges = bridge_resolver(None);
        let anchor = tessera_primitives::Bytes32::from_u64(0xa11ce);
        let txs = vec![
            TxDaoBuilder::new(1)
                .note_commitments(anchor, tessera_primitives::Bytes32::from_u64(2))
                .build(),
            // Same inner window as the anchor.
            TxDaoBuilder::new(2).backward_link(anchor).build(),
            // Next inner window.
            TxDaoBuilder::new(3).backward_link(anchor).build(),
            // Unresolvable link: silently ignored.
            TxDaoBuilder::new(4)
                .backward_link(tessera_primitives::Bytes32::from_u64(0xdead))
                .build(),
        ];

        let profile = profile_rollup(&txs, &fees, &bridges, 2, 2).await.unwrap();
        assert_eq!(profile.inner_chains, 1);
        assert_eq!(profile.outer_chains, 1);
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected() {
        let fees = fee_calculator(10_000, 2);
        let bridges = bridge_resolver(None);
        let txs: Vec<_> = (0..3).map(|i| TxDaoBuilder::new(i).build()).collect();
        assert!(matches!(
            profile_rollup(&txs, &fees, &bridges, 2, 1).await,
            Err(ProfilerError::BatchTooLarge { len: 3, capacity: 2 })
        ));
    }
}
