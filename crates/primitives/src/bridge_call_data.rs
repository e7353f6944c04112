//! Bridge call descriptors, encoded as a single 256-bit integer.
//!
//! Layout, low bits first:
//!
//! | bits    | field                  |
//! |---------|------------------------|
//! | 0..32   | bridge address id      |
//! | 32..62  | input asset id A       |
//! | 62..92  | input asset id B       |
//! | 92..122 | output asset id A      |
//! | 122..152| output asset id B      |
//! | 152..184| bit config             |
//! | 184..248| auxiliary data         |
//!
//! The bit config flags whether the second input/output slots are in use.

use ethnum::U256;

use crate::{asset::AssetId, errors::PrimitivesError};

const ADDRESS_SHIFT: u32 = 0;
const INPUT_A_SHIFT: u32 = 32;
const INPUT_B_SHIFT: u32 = 62;
const OUTPUT_A_SHIFT: u32 = 92;
const OUTPUT_B_SHIFT: u32 = 122;
const BITCONFIG_SHIFT: u32 = 152;
const AUX_DATA_SHIFT: u32 = 184;

const ADDRESS_BITS: u32 = 32;
const ASSET_ID_BITS: u32 = 30;
const BITCONFIG_BITS: u32 = 32;
const AUX_DATA_BITS: u32 = 64;

const SECOND_INPUT_IN_USE: u64 = 1;
const SECOND_OUTPUT_IN_USE: u64 = 2;

fn extract(v: U256, shift: u32, bits: u32) -> u64 {
    ((v >> shift) & ((U256::ONE << bits) - U256::ONE)).as_u64()
}

/// Descriptor of a single DeFi bridge interaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BridgeCallData {
    pub bridge_address_id: u32,
    pub input_asset_id_a: AssetId,
    pub input_asset_id_b: Option<AssetId>,
    pub output_asset_id_a: AssetId,
    pub output_asset_id_b: Option<AssetId>,
    pub aux_data: u64,
}

impl BridgeCallData {
    /// Encodes the descriptor into its canonical 256-bit form.
    pub fn encode(&self) -> U256 {
        let mut bitconfig = 0u64;
        if self.input_asset_id_b.is_some() {
            bitconfig |= SECOND_INPUT_IN_USE;
        }
        if self.output_asset_id_b.is_some() {
            bitconfig |= SECOND_OUTPUT_IN_USE;
        }

        U256::from(self.bridge_address_id) << ADDRESS_SHIFT
            | U256::from(self.input_asset_id_a.0) << INPUT_A_SHIFT
            | U256::from(self.input_asset_id_b.unwrap_or_default().0) << INPUT_B_SHIFT
            | U256::from(self.output_asset_id_a.0) << OUTPUT_A_SHIFT
            | U256::from(self.output_asset_id_b.unwrap_or_default().0) << OUTPUT_B_SHIFT
            | U256::from(bitconfig) << BITCONFIG_SHIFT
            | U256::from(self.aux_data) << AUX_DATA_SHIFT
    }

    /// Decodes a 256-bit call-data value. Bits beyond the defined layout
    /// must be zero.
    pub fn decode(v: U256) -> Result<Self, PrimitivesError> {
        if v >> (AUX_DATA_SHIFT + AUX_DATA_BITS) != U256::ZERO {
            return Err(PrimitivesError::MalformedBridgeCallData(v));
        }

        let bitconfig = extract(v, BITCONFIG_SHIFT, BITCONFIG_BITS);
        let input_b = (bitconfig & SECOND_INPUT_IN_USE != 0)
            .then(|| AssetId(extract(v, INPUT_B_SHIFT, ASSET_ID_BITS) as u32));
        let output_b = (bitconfig & SECOND_OUTPUT_IN_USE != 0)
            .then(|| AssetId(extract(v, OUTPUT_B_SHIFT, ASSET_ID_BITS) as u32));

        Ok(Self {
            bridge_address_id: extract(v, ADDRESS_SHIFT, ADDRESS_BITS) as u32,
            input_asset_id_a: AssetId(extract(v, INPUT_A_SHIFT, ASSET_ID_BITS) as u32),
            input_asset_id_b: input_b,
            output_asset_id_a: AssetId(extract(v, OUTPUT_A_SHIFT, ASSET_ID_BITS) as u32),
            output_asset_id_b: output_b,
            aux_data: extract(v, AUX_DATA_SHIFT, AUX_DATA_BITS),
        })
    }

    /// Iterates the non-virtual asset ids referenced by this descriptor.
    /// Virtual ids carry bridge-local meaning and are skipped for
    /// configuration matching.
    pub fn real_asset_ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        [
            Some(self.input_asset_id_a),
            self.input_asset_id_b,
            Some(self.output_asset_id_a),
            self.output_asset_id_b,
        ]
        .into_iter()
        .flatten()
        .filter(|id| !id.is_virtual())
    }

    /// Whether two descriptors describe the same bridge interaction for
    /// configuration purposes, ignoring auxiliary data and virtual asset
    /// ids.
    pub fn equivalent(&self, other: &Self) -> bool {
        fn slot_eq(a: Option<AssetId>, b: Option<AssetId>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) if !a.is_virtual() && !b.is_virtual() => a == b,
                (Some(a), None) | (None, Some(a)) => a.is_virtual(),
                _ => true,
            }
        }

        self.bridge_address_id == other.bridge_address_id
            && slot_eq(Some(self.input_asset_id_a), Some(other.input_asset_id_a))
            && slot_eq(self.input_asset_id_b, other.input_asset_id_b)
            && slot_eq(Some(self.output_asset_id_a), Some(other.output_asset_id_a))
            && slot_eq(self.output_asset_id_b, other.output_asset_id_b)
    }
}
