//! Gas-to-fee economics: the fee calculator and the per-batch excess-gas
//! allocator.

mod allocator;
mod calculator;
mod config;
mod error;
mod oracle;
#[cfg(test)]
mod test_utils;

pub use allocator::TxFeeAllocator;
pub use calculator::{AssetValue, FeeCalculator};
pub use config::FeeConfig;
pub use error::{FeeError, FeeResult};
pub use oracle::PriceOracle;
