//! Builders for constructing transactions in tests across the workspace.

use ethnum::U256;

use crate::{
    asset::AssetId, bridge_call_data::BridgeCallData, bytes32::Bytes32,
    proof_data::PROOF_DATA_SIZE, tx::TxDao, tx_type::TxType,
};

/// Builder assembling a [`TxDao`] with a well-formed proof blob.
///
/// Commitments and nullifiers default to values derived from the seed so
/// every built transaction is distinct.
#[derive(Clone, Debug)]
pub struct TxDaoBuilder {
    seed: u64,
    tx_type: TxType,
    fee: u128,
    fee_asset_id: AssetId,
    created: u64,
    second_class: bool,
    note_commitment_1: Bytes32,
    note_commitment_2: Bytes32,
    nullifier_1: Bytes32,
    nullifier_2: Bytes32,
    backward_link: Bytes32,
    allow_chain: u64,
    bridge_call_data: Option<BridgeCallData>,
}

impl TxDaoBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tx_type: TxType::Transfer,
            fee: 0,
            fee_asset_id: AssetId(0),
            created: 0,
            second_class: false,
            note_commitment_1: Bytes32::from_u64(seed * 1_000 + 1),
            note_commitment_2: Bytes32::from_u64(seed * 1_000 + 2),
            nullifier_1: Bytes32::from_u64(seed * 1_000 + 3),
            nullifier_2: Bytes32::from_u64(seed * 1_000 + 4),
            backward_link: Bytes32::ZERO,
            allow_chain: 0,
            bridge_call_data: None,
        }
    }

    pub fn tx_type(mut self, ty: TxType) -> Self {
        self.tx_type = ty;
        self
    }

    pub fn fee(mut self, fee: u128) -> Self {
        self.fee = fee;
        self
    }

    pub fn fee_asset_id(mut self, asset_id: AssetId) -> Self {
        self.fee_asset_id = asset_id;
        self
    }

    pub fn created(mut self, created: u64) -> Self {
        self.created = created;
        self
    }

    pub fn second_class(mut self, second_class: bool) -> Self {
        self.second_class = second_class;
        self
    }

    pub fn note_commitments(mut self, c1: Bytes32, c2: Bytes32) -> Self {
        self.note_commitment_1 = c1;
        self.note_commitment_2 = c2;
        self
    }

    pub fn nullifiers(mut self, n1: Bytes32, n2: Bytes32) -> Self {
        self.nullifier_1 = n1;
        self.nullifier_2 = n2;
        self
    }

    pub fn backward_link(mut self, link: Bytes32) -> Self {
        self.backward_link = link;
        self
    }

    pub fn allow_chain(mut self, allow_chain: u64) -> Self {
        self.allow_chain = allow_chain;
        self
    }

    pub fn bridge_call_data(mut self, call_data: BridgeCallData) -> Self {
        self.bridge_call_data = Some(call_data);
        self
    }

    pub fn build(self) -> TxDao {
        let mut proof = vec![0u8; PROOF_DATA_SIZE];
        let mut write = |i: usize, v: Bytes32| {
            proof[i * 32..(i + 1) * 32].copy_from_slice(v.as_bytes());
        };

        write(0, self.note_commitment_1);
        write(1, self.note_commitment_2);
        write(2, self.nullifier_1);
        write(3, self.nullifier_2);
        write(7, u256_word(U256::from(self.fee)));
        write(8, Bytes32::from_u64(u64::from(self.fee_asset_id.0)));
        if let Some(cd) = &self.bridge_call_data {
            write(9, u256_word(cd.encode()));
        }
        write(11, self.backward_link);
        write(12, Bytes32::from_u64(self.allow_chain));

        TxDao {
            id: Bytes32::from_u64(self.seed),
            proof_data: proof,
            created: self.created,
            tx_type: self.tx_type,
            fee_asset_id: self.fee_asset_id,
            excess_gas: 0,
            bridge_call_data: self.bridge_call_data,
            second_class: self.second_class,
        }
    }
}

fn u256_word(v: U256) -> Bytes32 {
    Bytes32::new(v.to_be_bytes())
}
