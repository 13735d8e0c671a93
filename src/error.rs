//! Error types for the ledger host, configuration and CLI

use alloy_primitives::{Address, Bytes};
use thiserror::Error;

use crate::wallet::{CallError, WalletError};

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type outside the wallet engine itself
#[derive(Error, Debug)]
pub enum Error {
    // Amount errors
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // Ledger errors
    #[error("Transaction to {target} reverted (reason: {reason})")]
    Reverted { target: Address, reason: Bytes },

    #[error("Call to {target} failed: {source}")]
    CallFailed { target: Address, source: CallError },

    #[error("Deployment by {deployer} failed (reason: {reason})")]
    DeploymentFailed { deployer: Address, reason: Bytes },

    #[error("No contract deployed at {0}")]
    NoContract(Address),

    // ABI errors
    #[error("ABI decode failed: {0}")]
    AbiDecode(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Revert payload of a failed transaction, if this is one
    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            Error::Reverted { reason, .. } | Error::DeploymentFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Decode the revert payload as a wallet rejection
    pub fn wallet_error(&self) -> Option<WalletError> {
        self.revert_data()
            .and_then(|data| WalletError::from_revert_data(data))
    }
}

impl From<alloy_sol_types::Error> for Error {
    fn from(e: alloy_sol_types::Error) -> Self {
        Error::AbiDecode(e.to_string())
    }
}

impl From<alloy_primitives::utils::UnitsError> for Error {
    fn from(e: alloy_primitives::utils::UnitsError) -> Self {
        Error::InvalidAmount(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
