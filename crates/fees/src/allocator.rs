//! Excess-gas redistribution across a batch.

use std::sync::Arc;

use tessera_bridge::BridgeResolver;
use tessera_primitives::{AssetId, TxDao, TxType};
use tracing::debug;

use crate::{
    calculator::FeeCalculator,
    error::{FeeError, FeeResult},
};

/// Validates a batch's fee-paying assets and redistributes any surplus gas
/// purchased by the attached fees. Stateless; safe to share.
pub struct TxFeeAllocator {
    fees: Arc<FeeCalculator>,
    bridges: Arc<BridgeResolver>,
}

impl std::fmt::Debug for TxFeeAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxFeeAllocator").finish_non_exhaustive()
    }
}

impl TxFeeAllocator {
    pub fn new(fees: Arc<FeeCalculator>, bridges: Arc<BridgeResolver>) -> Self {
        Self { fees, bridges }
    }

    /// Checks the batch pays fees in exactly one distinct asset, or in none
    /// when `exit_only`. Returns the fee-paying asset, if any.
    pub fn validate_received_txs(
        &self,
        txs: &[TxDao],
        exit_only: bool,
    ) -> FeeResult<Option<AssetId>> {
        let mut assets: Vec<AssetId> = Vec::new();
        for tx in txs {
            if tx.is_fee_paying()? && !assets.contains(&tx.fee_asset_id) {
                assets.push(tx.fee_asset_id);
            }
        }

        match assets.len() {
            0 if exit_only => Ok(None),
            0 => Err(FeeError::NoFeePayingAsset),
            1 => Ok(Some(assets[0])),
            _ => Err(FeeError::MultipleFeePayingAssets(assets)),
        }
    }

    /// Adjusted gas one transaction must have covered by fees. DeFi
    /// deposits carry their bridge share and the gas of the claim they
    /// will produce.
    async fn tx_gas_required(&self, tx: &TxDao) -> FeeResult<u64> {
        let mut gas = self.fees.adjusted_tx_gas(tx.fee_asset_id, tx.tx_type);
        if tx.tx_type == TxType::DefiDeposit {
            let call_data = tx
                .bridge_call_data
                .as_ref()
                .ok_or(FeeError::MissingBridgeCallData(tx.id))?;
            gas += self.bridges.min_bridge_tx_gas(call_data).await?;
            gas += self.fees.adjusted_tx_gas(tx.fee_asset_id, TxType::DefiClaim);
        }
        Ok(gas)
    }

    /// Gas purchased by the fee attached to one transaction.
    fn tx_gas_provided(&self, tx: &TxDao, fee_asset: AssetId) -> FeeResult<u64> {
        if tx.fee_asset_id != fee_asset {
            return Ok(0);
        }
        Ok(self.fees.gas_paid_for_by_fee(fee_asset, tx.fee()?))
    }

    /// Total adjusted gas the batch must cover.
    pub async fn gas_required(&self, txs: &[TxDao]) -> FeeResult<u64> {
        let mut total = 0u64;
        for tx in txs {
            total += self.tx_gas_required(tx).await?;
        }
        Ok(total)
    }

    /// Total gas purchased by fees attached to `fee_asset` transactions.
    pub fn gas_provided(&self, txs: &[TxDao], fee_asset: AssetId) -> FeeResult<u64> {
        let mut total = 0u64;
        for tx in txs {
            total += self.tx_gas_provided(tx, fee_asset)?;
        }
        Ok(total)
    }

    /// Validates the batch and assigns surplus gas to `excess_gas` fields.
    ///
    /// With no feeless transactions, each transaction keeps its own
    /// surplus. Otherwise the entire surplus lands on the single DeFi
    /// deposit if present, else on the first feeless transaction; an
    /// unattributable surplus is a hard error.
    pub async fn reallocate_gas(&self, txs: &mut [TxDao], exit_only: bool) -> FeeResult<()> {
        for tx in txs.iter_mut() {
            tx.excess_gas = 0;
        }

        let Some(fee_asset) = self.validate_received_txs(txs, exit_only)? else {
            return Ok(());
        };

        let required = self.gas_required(txs).await?;
        let provided = self.gas_provided(txs, fee_asset)?;
        if provided <= required {
            return Ok(());
        }
        let surplus = provided - required;
        debug!(surplus, required, provided, "redistributing excess gas");

        let mut has_feeless = false;
        for tx in txs.iter() {
            if !tx.is_fee_paying()? {
                has_feeless = true;
                break;
            }
        }

        if !has_feeless {
            // An underpaying transaction's deficit shrinks the batch
            // surplus, so cap what the overpayers keep at what the batch
            // actually earned.
            let mut remaining = surplus;
            for tx in txs.iter_mut() {
                let provided = self.tx_gas_provided(tx, fee_asset)?;
                let required = self.tx_gas_required(tx).await?;
                tx.excess_gas = provided.saturating_sub(required).min(remaining);
                remaining -= tx.excess_gas;
            }
            return Ok(());
        }

        if let Some(tx) = txs.iter_mut().find(|tx| tx.tx_type == TxType::DefiDeposit) {
            tx.excess_gas = surplus;
            return Ok(());
        }

        for tx in txs.iter_mut() {
            if !tx.is_fee_paying()? {
                tx.excess_gas = surplus;
                return Ok(());
            }
        }

        Err(FeeError::UnattributableSurplus(surplus))
    }
}
