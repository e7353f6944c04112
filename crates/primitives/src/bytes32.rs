//! Fixed 32-byte word used for commitments, nullifiers, and tree roots.

use std::fmt;

use crate::errors::PrimitivesError;

/// A 32-byte value as it appears in proof data and Merkle trees.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes32([u8; 32]);

impl Bytes32 {
    /// The all-zero word, also the reserved "no-op" nullifier.
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn new(buf: [u8; 32]) -> Self {
        Self(buf)
    }

    /// Builds a word holding `v` in its big-endian tail, matching the
    /// proof-data field encoding.
    pub fn from_u64(v: u64) -> Self {
        let mut buf = [0u8; 32];
        buf[24..].copy_from_slice(&v.to_be_bytes());
        Self(buf)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, PrimitivesError> {
        if slice.len() != 32 {
            return Err(PrimitivesError::InvalidWordLength(slice.len()));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(slice);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The big-endian low 8 bytes, used where a word indexes a u64-addressed
    /// tree slot.
    pub fn low_u64(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[24..]);
        u64::from_be_bytes(buf)
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(buf: [u8; 32]) -> Self {
        Self(buf)
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({self})")
    }
}
