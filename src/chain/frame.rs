//! Execution context handed to contract code

use std::rc::Rc;

use alloy_primitives::{Address, Bytes, B256, U256};

use super::types::{Event, LogEntry};
use super::{Contract, Ledger};
use crate::wallet::{CallError, CallSink, ExternalCallRequest, WalletEvent, WalletHost};

/// Who called whom, with how much value, at what depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub address: Address,
    pub value: U256,
    pub depth: usize,
}

/// One executing call frame
pub struct Frame<'a> {
    ledger: &'a mut Ledger,
    context: CallContext,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger, context: CallContext) -> Self {
        Self { ledger, context }
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub fn caller(&self) -> Address {
        self.context.caller
    }

    /// Address of the executing contract
    pub fn address(&self) -> Address {
        self.context.address
    }

    /// Wei attached to this call
    pub fn value(&self) -> U256 {
        self.context.value
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balance(account)
    }

    /// Read a word from the executing contract's storage
    pub fn sload(&self, key: B256) -> U256 {
        self.ledger.storage(self.context.address, key)
    }

    /// Write a word to the executing contract's storage
    pub fn sstore(&mut self, key: B256, value: U256) {
        self.ledger.storage_write(self.context.address, key, value);
    }

    /// Emit an event attributed to the executing contract
    pub fn log(&mut self, event: impl Into<Event>) {
        let entry = LogEntry {
            emitter: self.context.address,
            event: event.into(),
        };
        self.ledger.push_log(entry);
    }

    /// Call another account with the executing contract as sender
    pub fn call(&mut self, request: ExternalCallRequest) -> Result<Bytes, CallError> {
        self.ledger.call(self.context.address, request)
    }

    /// Deploy a contract with the executing contract as deployer
    pub fn deploy(&mut self, contract: Rc<dyn Contract>) -> Result<Address, Bytes> {
        self.ledger.create(self.context.address, contract)
    }
}

impl CallSink for Frame<'_> {
    fn invoke(&mut self, request: ExternalCallRequest) -> Result<Bytes, CallError> {
        self.call(request)
    }
}

impl WalletHost for Frame<'_> {
    fn caller(&self) -> Address {
        self.context.caller
    }

    fn address(&self) -> Address {
        self.context.address
    }

    fn self_balance(&self) -> U256 {
        self.ledger.balance(self.context.address)
    }

    fn emit(&mut self, event: WalletEvent) {
        self.log(event);
    }
}
