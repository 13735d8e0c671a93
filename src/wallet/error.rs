//! Wallet rejection taxonomy
//!
//! Every variant maps one-to-one onto an ABI error of `IContractWallet`, so a
//! rejection survives the trip through revert data unchanged.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolError, SolInterface};
use thiserror::Error;

use crate::abi::IContractWallet;

/// Reasons a privileged wallet operation is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Unauthorized caller {caller}")]
    Unauthorized { caller: Address },

    #[error("Zero address is not a valid destination")]
    ZeroAddress,

    #[error("Insufficient balance: {available} wei available, {required} wei required")]
    InsufficientBalance { available: U256, required: U256 },

    #[error("Transfer of {amount} wei rejected by {recipient}")]
    TransferRejected {
        recipient: Address,
        amount: U256,
        reason: Bytes,
    },

    #[error("External call to {target} failed")]
    ExternalCallFailed { target: Address, reason: Bytes },

    #[error("Reentrant privileged call rejected")]
    ReentrancyRejected,
}

impl WalletError {
    /// ABI-encoded revert payload for this rejection
    pub fn to_revert_data(&self) -> Bytes {
        let encoded = match self {
            WalletError::Unauthorized { caller } => {
                IContractWallet::Unauthorized { caller: *caller }.abi_encode()
            }
            WalletError::ZeroAddress => IContractWallet::ZeroAddress {}.abi_encode(),
            WalletError::InsufficientBalance {
                available,
                required,
            } => IContractWallet::InsufficientBalance {
                available: *available,
                required: *required,
            }
            .abi_encode(),
            WalletError::TransferRejected {
                recipient,
                amount,
                reason,
            } => IContractWallet::TransferRejected {
                recipient: *recipient,
                amount: *amount,
                reason: reason.clone(),
            }
            .abi_encode(),
            WalletError::ExternalCallFailed { target, reason } => {
                IContractWallet::ExternalCallFailed {
                    target: *target,
                    reason: reason.clone(),
                }
                .abi_encode()
            }
            WalletError::ReentrancyRejected => IContractWallet::ReentrancyRejected {}.abi_encode(),
        };
        Bytes::from(encoded)
    }

    /// Decode a revert payload produced by [`WalletError::to_revert_data`]
    pub fn from_revert_data(data: &[u8]) -> Option<Self> {
        use IContractWallet::IContractWalletErrors as Errors;

        let decoded = Errors::abi_decode(data, true).ok()?;
        Some(match decoded {
            Errors::Unauthorized(e) => WalletError::Unauthorized { caller: e.caller },
            Errors::ZeroAddress(_) => WalletError::ZeroAddress,
            Errors::InsufficientBalance(e) => WalletError::InsufficientBalance {
                available: e.available,
                required: e.required,
            },
            Errors::TransferRejected(e) => WalletError::TransferRejected {
                recipient: e.recipient,
                amount: e.amount,
                reason: e.reason,
            },
            Errors::ExternalCallFailed(e) => WalletError::ExternalCallFailed {
                target: e.target,
                reason: e.reason,
            },
            Errors::ReentrancyRejected(_) => WalletError::ReentrancyRejected,
        })
    }

    /// Revert payload relayed from the failing collaborator, if any
    pub fn reason(&self) -> Option<&Bytes> {
        match self {
            WalletError::TransferRejected { reason, .. }
            | WalletError::ExternalCallFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_data_decodes_back() {
        let errors = [
            WalletError::Unauthorized {
                caller: Address::repeat_byte(0xaa),
            },
            WalletError::ZeroAddress,
            WalletError::InsufficientBalance {
                available: U256::from(1u64),
                required: U256::from(2u64),
            },
            WalletError::TransferRejected {
                recipient: Address::repeat_byte(0x01),
                amount: U256::from(7u64),
                reason: Bytes::from_static(b"nope"),
            },
            WalletError::ExternalCallFailed {
                target: Address::repeat_byte(0x02),
                reason: Bytes::new(),
            },
            WalletError::ReentrancyRejected,
        ];

        for err in errors {
            let data = err.to_revert_data();
            assert_eq!(WalletError::from_revert_data(&data), Some(err));
        }
    }

    #[test]
    fn test_foreign_revert_data_is_not_a_wallet_error() {
        assert_eq!(WalletError::from_revert_data(&[]), None);
        assert_eq!(WalletError::from_revert_data(&[0xde, 0xad, 0xbe, 0xef]), None);
    }

    #[test]
    fn test_reason_only_on_forwarding_failures() {
        let err = WalletError::ExternalCallFailed {
            target: Address::ZERO,
            reason: Bytes::from_static(b"x"),
        };
        assert_eq!(err.reason(), Some(&Bytes::from_static(b"x")));
        assert!(WalletError::ReentrancyRejected.reason().is_none());
    }
}
