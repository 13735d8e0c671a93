//! Logs and receipts produced by the ledger

use alloy_primitives::{Address, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::{FactoryEvent, TokenEvent};
use crate::wallet::WalletEvent;

/// Any event a contract on the ledger can emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Wallet(WalletEvent),
    Token(TokenEvent),
    Factory(FactoryEvent),
}

impl From<WalletEvent> for Event {
    fn from(event: WalletEvent) -> Self {
        Event::Wallet(event)
    }
}

impl From<TokenEvent> for Event {
    fn from(event: TokenEvent) -> Self {
        Event::Token(event)
    }
}

impl From<FactoryEvent> for Event {
    fn from(event: FactoryEvent) -> Self {
        Event::Factory(event)
    }
}

/// An event together with the contract that emitted it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub emitter: Address,
    pub event: Event,
}

/// Outcome of a successful transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique receipt ID
    pub id: Uuid,

    pub from: Address,
    pub to: Address,

    /// Wei attached to the transaction
    pub value: U256,

    /// Sender nonce consumed by the transaction
    pub nonce: u64,

    /// Data returned by `to`
    pub output: Bytes,

    /// Events in emission order
    pub logs: Vec<LogEntry>,

    pub executed_at: DateTime<Utc>,
}

impl Receipt {
    /// Wallet audit events in this receipt
    pub fn wallet_events(&self) -> impl Iterator<Item = &WalletEvent> + '_ {
        self.logs.iter().filter_map(|log| match &log.event {
            Event::Wallet(event) => Some(event),
            _ => None,
        })
    }

    /// Token events in this receipt, with the emitting token
    pub fn token_events(&self) -> impl Iterator<Item = (Address, &TokenEvent)> + '_ {
        self.logs.iter().filter_map(|log| match &log.event {
            Event::Token(event) => Some((log.emitter, event)),
            _ => None,
        })
    }

    /// Addresses of tokens created by a factory in this receipt
    pub fn created_tokens(&self) -> Vec<Address> {
        self.logs
            .iter()
            .filter_map(|log| match &log.event {
                Event::Factory(FactoryEvent::Erc20TokenCreated { token_address }) => {
                    Some(*token_address)
                }
                _ => None,
            })
            .collect()
    }
}
