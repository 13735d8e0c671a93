//! In-memory ledger hosting the wallet and its collaborators
//!
//! Deterministic, single-threaded and transactional: every call frame takes a
//! checkpoint of the world state and restores it if the frame fails, so a
//! failed call leaves no balance change, storage write or log behind.
//!
//! # Architecture
//!
//! ```text
//! Ledger::transact → Ledger::call → Contract::call(Frame)
//!                         ↑                 │
//!                         └── Frame::call ──┘   (nested, depth-limited)
//! ```

pub mod frame;
pub mod types;

pub use frame::{CallContext, Frame};
pub use types::{Event, LogEntry, Receipt};

use std::collections::HashMap;
use std::rc::Rc;

use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::wallet::{CallError, ExternalCallRequest};

/// Code deployed on the ledger.
///
/// Persistent state lives in ledger storage so it is covered by checkpoints.
/// `self` holds configuration plus transient per-call guards (such as a
/// reentrancy flag) that are reset before the call returns.
pub trait Contract {
    /// Handle a message call. `Err` carries revert data.
    fn call(&self, frame: &mut Frame<'_>, input: &[u8]) -> std::result::Result<Bytes, Bytes>;

    /// Run once when the contract is installed; the frame's caller is the deployer
    fn deployed(&self, _frame: &mut Frame<'_>) -> std::result::Result<(), Bytes> {
        Ok(())
    }

    /// Human-readable name used in logs
    fn name(&self) -> &str;
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Chain identifier, informational only
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Maximum nesting of call frames
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

fn default_chain_id() -> u64 {
    31337
}

fn default_max_call_depth() -> usize {
    1024
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            max_call_depth: default_max_call_depth(),
        }
    }
}

#[derive(Clone, Default)]
struct WorldState {
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    code: HashMap<Address, Rc<dyn Contract>>,
    storage: HashMap<Address, HashMap<B256, U256>>,
}

struct Checkpoint {
    state: WorldState,
    log_len: usize,
}

/// The host ledger
pub struct Ledger {
    config: LedgerConfig,
    state: WorldState,
    logs: Vec<LogEntry>,
    depth: usize,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            state: WorldState::default(),
            logs: Vec::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Native balance of `account` in wei
    pub fn balance(&self, account: Address) -> U256 {
        self.state
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn nonce(&self, account: Address) -> u64 {
        self.state.nonces.get(&account).copied().unwrap_or(0)
    }

    pub fn has_code(&self, account: Address) -> bool {
        self.state.code.contains_key(&account)
    }

    /// Raw storage word of a contract
    pub fn storage(&self, account: Address, key: B256) -> U256 {
        self.state
            .storage
            .get(&account)
            .and_then(|slots| slots.get(&key))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Credit `amount` wei out of thin air (genesis allocation)
    pub fn fund(&mut self, account: Address, amount: U256) -> Result<()> {
        let balance = self.balance(account);
        let funded = balance
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidAmount(format!("funding {} overflows balance", account)))?;
        self.state.balances.insert(account, funded);
        debug!("Funded {} with {} wei", account, amount);
        Ok(())
    }

    /// Install `contract` at the next address derived from `deployer`
    pub fn deploy(&mut self, deployer: Address, contract: Rc<dyn Contract>) -> Result<Address> {
        self.logs.clear();
        let name = contract.name().to_string();
        let result = self.create(deployer, contract);
        self.logs.clear();

        let address = result.map_err(|reason| Error::DeploymentFailed { deployer, reason })?;
        info!("Deployed {} at {}", name, address);
        Ok(address)
    }

    /// Execute a top-level transaction
    ///
    /// # Arguments
    /// * `from` - Sender, becomes the caller of `to`
    /// * `to` - Account receiving the call
    /// * `value` - Wei moved from `from` to `to` before `to` runs
    /// * `data` - Call payload (empty for a plain transfer)
    ///
    /// # Returns
    /// Receipt with the return data and logs on success. On failure nothing
    /// but the sender's nonce changes.
    pub fn transact(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Receipt> {
        let nonce = self.bump_nonce(from);
        self.logs.clear();

        debug!(
            "Transaction {} from {}: {} wei, {} bytes to {}",
            nonce,
            from,
            value,
            data.len(),
            to
        );

        let result = self.call(from, ExternalCallRequest::new(to, value, data));
        let logs = std::mem::take(&mut self.logs);

        match result {
            Ok(output) => Ok(Receipt {
                id: Uuid::new_v4(),
                from,
                to,
                value,
                nonce,
                output,
                logs,
                executed_at: Utc::now(),
            }),
            Err(CallError::Reverted { data }) => {
                warn!("Transaction {} from {} reverted", nonce, from);
                Err(Error::Reverted {
                    target: to,
                    reason: data,
                })
            }
            Err(source) => {
                warn!("Transaction {} from {} failed: {}", nonce, from, source);
                Err(Error::CallFailed { target: to, source })
            }
        }
    }

    /// Run a read-only call; all effects are discarded
    pub fn view(&mut self, to: Address, data: Bytes) -> Result<Bytes> {
        let checkpoint = self.checkpoint();
        let result = self.call(Address::ZERO, ExternalCallRequest::new(to, U256::ZERO, data));
        self.restore(checkpoint);

        result.map_err(|e| match e {
            CallError::Reverted { data } => Error::Reverted {
                target: to,
                reason: data,
            },
            source => Error::CallFailed { target: to, source },
        })
    }

    /// Perform one call frame, rolling it back entirely on failure
    pub(crate) fn call(
        &mut self,
        caller: Address,
        request: ExternalCallRequest,
    ) -> std::result::Result<Bytes, CallError> {
        if self.depth >= self.config.max_call_depth {
            return Err(CallError::DepthExceeded { depth: self.depth });
        }

        let checkpoint = self.checkpoint();
        let result = self.run_frame(caller, request);
        if result.is_err() {
            self.restore(checkpoint);
        }
        result
    }

    /// Install a contract on behalf of `deployer` (top level or from a frame)
    pub(crate) fn create(
        &mut self,
        deployer: Address,
        contract: Rc<dyn Contract>,
    ) -> std::result::Result<Address, Bytes> {
        if self.depth >= self.config.max_call_depth {
            return Err(Bytes::new());
        }

        let nonce = self.bump_nonce(deployer);
        let address = deployer.create(nonce);

        let checkpoint = self.checkpoint();
        self.state.code.insert(address, Rc::clone(&contract));

        self.depth += 1;
        let context = CallContext {
            caller: deployer,
            address,
            value: U256::ZERO,
            depth: self.depth,
        };
        let result = contract.deployed(&mut Frame::new(self, context));
        self.depth -= 1;

        match result {
            Ok(()) => Ok(address),
            Err(reason) => {
                self.restore(checkpoint);
                Err(reason)
            }
        }
    }

    pub(crate) fn push_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    pub(crate) fn storage_write(&mut self, account: Address, key: B256, value: U256) {
        let slots = self.state.storage.entry(account).or_default();
        if value.is_zero() {
            slots.remove(&key);
        } else {
            slots.insert(key, value);
        }
    }

    fn run_frame(
        &mut self,
        caller: Address,
        request: ExternalCallRequest,
    ) -> std::result::Result<Bytes, CallError> {
        self.move_value(caller, request.target, request.value)?;

        let Some(code) = self.state.code.get(&request.target).cloned() else {
            if request.payload.is_empty() {
                return Ok(Bytes::new());
            }
            return Err(CallError::NoCode {
                target: request.target,
            });
        };

        self.depth += 1;
        let context = CallContext {
            caller,
            address: request.target,
            value: request.value,
            depth: self.depth,
        };
        debug!(
            "Frame {} entering {} at {} (caller {})",
            context.depth,
            code.name(),
            request.target,
            caller
        );
        let result = code.call(&mut Frame::new(self, context), &request.payload);
        self.depth -= 1;

        result.map_err(|data| CallError::Reverted { data })
    }

    // Debits the sender before any recipient code runs.
    fn move_value(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> std::result::Result<(), CallError> {
        if value.is_zero() {
            return Ok(());
        }

        let available = self.balance(from);
        if available < value {
            return Err(CallError::InsufficientFunds {
                available,
                required: value,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(value)
            .ok_or(CallError::BalanceOverflow { account: to, value })?;
        self.state.balances.insert(from, available - value);
        self.state.balances.insert(to, credited);
        Ok(())
    }

    fn bump_nonce(&mut self, account: Address) -> u64 {
        let nonce = self.state.nonces.entry(account).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            log_len: self.logs.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.logs.truncate(checkpoint.log_len);
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
