//! Bit-exact layout of the public inputs carried by a transaction's proof
//! blob. Fields are contiguous 32-byte words at fixed offsets.

use ethnum::U256;

use crate::{asset::AssetId, bytes32::Bytes32, errors::PrimitivesError};

/// Field offsets within a proof blob, in 32-byte words.
mod offsets {
    pub(super) const NOTE_COMMITMENT_1: usize = 0;
    pub(super) const NOTE_COMMITMENT_2: usize = 1;
    pub(super) const NULLIFIER_1: usize = 2;
    pub(super) const NULLIFIER_2: usize = 3;
    pub(super) const PUBLIC_VALUE: usize = 4;
    pub(super) const PUBLIC_OWNER: usize = 5;
    pub(super) const PUBLIC_ASSET_ID: usize = 6;
    pub(super) const TX_FEE: usize = 7;
    pub(super) const TX_FEE_ASSET_ID: usize = 8;
    pub(super) const BRIDGE_CALL_DATA: usize = 9;
    pub(super) const DEFI_DEPOSIT_VALUE: usize = 10;
    pub(super) const BACKWARD_LINK: usize = 11;
    pub(super) const ALLOW_CHAIN: usize = 12;
}

/// Number of 32-byte fields in the fixed layout.
pub const PROOF_DATA_FIELDS: usize = 13;

/// Minimum byte length of a proof blob.
pub const PROOF_DATA_SIZE: usize = PROOF_DATA_FIELDS * 32;

/// Parsed view of a proof blob's fixed-offset public inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofData {
    pub note_commitment_1: Bytes32,
    pub note_commitment_2: Bytes32,
    pub nullifier_1: Bytes32,
    pub nullifier_2: Bytes32,
    pub public_value: Bytes32,
    pub public_owner: Bytes32,
    pub public_asset_id: Bytes32,
    pub tx_fee: Bytes32,
    pub tx_fee_asset_id: Bytes32,
    pub bridge_call_data: Bytes32,
    pub defi_deposit_value: Bytes32,
    pub backward_link: Bytes32,
    pub allow_chain: Bytes32,
}

impl ProofData {
    /// Parses the fixed-offset fields. Trailing bytes beyond the public
    /// inputs (the proof itself) are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < PROOF_DATA_SIZE {
            return Err(PrimitivesError::MalformedProofData {
                expected: PROOF_DATA_SIZE,
                got: bytes.len(),
            });
        }

        let field = |i: usize| {
            let mut word = [0u8; 32];
            word.copy_from_slice(&bytes[i * 32..(i + 1) * 32]);
            Bytes32::new(word)
        };

        Ok(Self {
            note_commitment_1: field(offsets::NOTE_COMMITMENT_1),
            note_commitment_2: field(offsets::NOTE_COMMITMENT_2),
            nullifier_1: field(offsets::NULLIFIER_1),
            nullifier_2: field(offsets::NULLIFIER_2),
            public_value: field(offsets::PUBLIC_VALUE),
            public_owner: field(offsets::PUBLIC_OWNER),
            public_asset_id: field(offsets::PUBLIC_ASSET_ID),
            tx_fee: field(offsets::TX_FEE),
            tx_fee_asset_id: field(offsets::TX_FEE_ASSET_ID),
            bridge_call_data: field(offsets::BRIDGE_CALL_DATA),
            defi_deposit_value: field(offsets::DEFI_DEPOSIT_VALUE),
            backward_link: field(offsets::BACKWARD_LINK),
            allow_chain: field(offsets::ALLOW_CHAIN),
        })
    }

    /// The fee attached to this transaction. Fees fit in 128 bits by
    /// protocol construction.
    pub fn tx_fee(&self) -> u128 {
        U256::from_be_bytes(*self.tx_fee.as_bytes()).as_u128()
    }

    pub fn fee_asset_id(&self) -> AssetId {
        AssetId(self.tx_fee_asset_id.low_u64() as u32)
    }

    pub fn bridge_call_data_u256(&self) -> U256 {
        U256::from_be_bytes(*self.bridge_call_data.as_bytes())
    }

    pub fn defi_deposit_value(&self) -> u128 {
        U256::from_be_bytes(*self.defi_deposit_value.as_bytes()).as_u128()
    }

    pub fn allow_chain(&self) -> u64 {
        self.allow_chain.low_u64()
    }

    /// The not-yet-settled commitment this transaction consumes, if any.
    pub fn backward_link(&self) -> Option<Bytes32> {
        (!self.backward_link.is_zero()).then_some(self.backward_link)
    }
}
