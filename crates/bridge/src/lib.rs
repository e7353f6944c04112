//! Bridge configuration and subsidy resolution.
//!
//! Maps a bridge call descriptor to its configured gas budget, permitted
//! assets, and any externally funded subsidy. Subsidy lookups are cached
//! per exact call-data value and invalidated wholesale on every new
//! base-chain block.

mod config;
mod error;
mod resolver;
mod subsidy;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use resolver::BridgeResolver;
pub use subsidy::{BridgeContract, BridgeSubsidy, SubsidyProvider};
