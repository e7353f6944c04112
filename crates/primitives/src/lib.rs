//! Core data types shared across the rollup pipeline: identifiers, asset
//! ids, transaction kinds, bridge call data, and the fixed proof-data
//! binary layout.

pub mod asset;
pub mod bridge_call_data;
pub mod bytes32;
pub mod errors;
pub mod proof_data;
pub mod test_utils;
pub mod tx;
pub mod tx_type;

pub use asset::AssetId;
pub use bridge_call_data::BridgeCallData;
pub use bytes32::Bytes32;
pub use errors::PrimitivesError;
pub use proof_data::{ProofData, PROOF_DATA_SIZE};
pub use tx::{TxDao, TxId};
pub use tx_type::TxType;
