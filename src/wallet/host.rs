//! Seams between the wallet engine and whatever executes its calls
//!
//! The engine never talks to the ledger directly. It sees its immediate
//! caller, its own balance and a [`CallSink`] to forward calls into; the
//! ledger's call frame implements these, and so do test doubles.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::WalletEvent;

/// A message call the wallet asks its host to perform, with the wallet as sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCallRequest {
    pub target: Address,
    pub value: U256,
    pub payload: Bytes,
}

impl ExternalCallRequest {
    pub fn new(target: Address, value: U256, payload: Bytes) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }

    /// Plain value transfer with no payload
    pub fn value_transfer(target: Address, value: U256) -> Self {
        Self::new(target, value, Bytes::new())
    }
}

/// Why a forwarded call did not complete
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("call reverted")]
    Reverted { data: Bytes },

    #[error("no code at {target}")]
    NoCode { target: Address },

    #[error("insufficient funds: {available} wei available, {required} wei required")]
    InsufficientFunds { available: U256, required: U256 },

    #[error("call depth {depth} exceeded")]
    DepthExceeded { depth: usize },

    #[error("crediting {value} wei would overflow the balance of {account}")]
    BalanceOverflow { account: Address, value: U256 },
}

impl CallError {
    /// Revert payload produced by the target (empty when the call never ran)
    pub fn revert_data(&self) -> Bytes {
        match self {
            CallError::Reverted { data } => data.clone(),
            _ => Bytes::new(),
        }
    }
}

/// Dispatches forwarded calls on the wallet's behalf
pub trait CallSink {
    /// Perform `request` with the wallet as message sender.
    ///
    /// On failure none of the call's effects may remain visible.
    fn invoke(&mut self, request: ExternalCallRequest) -> Result<Bytes, CallError>;
}

/// Execution environment of a single wallet entry point
pub trait WalletHost: CallSink {
    /// Immediate caller of the current entry point
    fn caller(&self) -> Address;

    /// The wallet's own address
    fn address(&self) -> Address;

    /// The wallet's current native balance
    fn self_balance(&self) -> U256;

    /// Append an audit event
    fn emit(&mut self, event: WalletEvent);
}
