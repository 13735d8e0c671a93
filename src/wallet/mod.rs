//! Single-owner custodial wallet
//!
//! Holds native currency and tokens on the ledger and forwards calls on its
//! owner's behalf:
//! - Deposits from anyone
//! - Native and token transfers, owner only
//! - Arbitrary call execution, owner only
//! - Reentrancy protection across all privileged entry points
//!
//! # Architecture
//!
//! ```text
//! WalletClient → Ledger → Contract for WalletEngine → WalletEngine
//!                                                          │
//!                                   ReentrancyLock ← ──────┤
//!                                   WalletHost (Frame) ← ──┘
//! ```
//!
//! # Security
//!
//! The owner is fixed at deployment. Nothing can change it, and every
//! privileged entry point checks it before any state is touched.

pub mod client;
pub mod contract;
pub mod engine;
pub mod error;
pub mod guard;
pub mod host;
pub mod types;

pub use client::WalletClient;
pub use engine::WalletEngine;
pub use error::WalletError;
pub use guard::{LockGuard, ReentrancyLock};
pub use host::{CallError, CallSink, ExternalCallRequest, WalletHost};
pub use types::{OwnerConfig, WalletEvent};
