//! Transaction kinds recognized by the pipeline.

use crate::errors::PrimitivesError;

/// Kind of a rollup transaction, with stable numeric discriminants matching
/// the proof encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxType {
    Deposit = 0,
    Transfer = 1,
    WithdrawToWallet = 2,
    WithdrawHighGas = 3,
    Account = 4,
    DefiDeposit = 5,
    DefiClaim = 6,
}

impl TxType {
    /// Number of distinct transaction kinds.
    pub const COUNT: usize = 7;

    /// All kinds in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Deposit,
        Self::Transfer,
        Self::WithdrawToWallet,
        Self::WithdrawHighGas,
        Self::Account,
        Self::DefiDeposit,
        Self::DefiClaim,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_defi(&self) -> bool {
        matches!(self, Self::DefiDeposit | Self::DefiClaim)
    }

    pub fn from_u8(v: u8) -> Result<Self, PrimitivesError> {
        Self::ALL
            .get(v as usize)
            .copied()
            .ok_or(PrimitivesError::InvalidTxType(v))
    }
}
