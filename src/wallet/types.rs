//! Core types for the wallet engine
//!
//! Defines the owner configuration and the audit events emitted after
//! successful privileged operations.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Immutable ownership configuration, fixed at deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// The single controller allowed to move value out of the wallet
    pub owner: Address,
}

impl OwnerConfig {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// Check whether `caller` is the controller
    pub fn is_owner(&self, caller: Address) -> bool {
        caller == self.owner
    }
}

/// Audit event emitted after a successful privileged operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum WalletEvent {
    /// Native currency left the wallet
    NativeTransferred { recipient: Address, amount: U256 },

    /// A token collaborator accepted a `transfer` from the wallet
    TokenTransferred {
        token: Address,
        recipient: Address,
        amount: U256,
    },

    /// A forwarded call completed
    ExecutedTransaction {
        target: Address,
        value: U256,
        data: Bytes,
        result: Bytes,
    },
}

impl std::fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletEvent::NativeTransferred { recipient, amount } => {
                write!(f, "NativeTransferred({} wei -> {})", amount, recipient)
            }
            WalletEvent::TokenTransferred {
                token,
                recipient,
                amount,
            } => write!(f, "TokenTransferred({} of {} -> {})", amount, token, recipient),
            WalletEvent::ExecutedTransaction {
                target,
                value,
                data,
                result,
            } => write!(
                f,
                "ExecutedTransaction({} wei -> {}, {} bytes in, {} bytes out)",
                value,
                target,
                data.len(),
                result.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_check() {
        let owner = Address::repeat_byte(0x0a);
        let config = OwnerConfig::new(owner);

        assert!(config.is_owner(owner));
        assert!(!config.is_owner(Address::repeat_byte(0x0b)));
        assert!(!config.is_owner(Address::ZERO));
    }

    #[test]
    fn test_event_serialization() {
        let event = WalletEvent::NativeTransferred {
            recipient: Address::repeat_byte(0x01),
            amount: U256::from(42u64),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"NativeTransferred\""));

        let parsed: WalletEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_display() {
        let event = WalletEvent::TokenTransferred {
            token: Address::repeat_byte(0x01),
            recipient: Address::repeat_byte(0x02),
            amount: U256::from(5u64),
        };
        assert!(event.to_string().starts_with("TokenTransferred(5 of "));
    }
}
