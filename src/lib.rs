//! Contract Wallet Library
//!
//! Single-owner custodial wallet hosted on a deterministic in-memory ledger,
//! with reference ERC-20 collaborators to drive it.

pub mod abi;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod token;
pub mod units;
pub mod wallet;

// Re-export commonly used types
pub use chain::Ledger;
pub use config::Config;
pub use error::{Error, Result};
pub use wallet::{WalletClient, WalletEngine, WalletError};
