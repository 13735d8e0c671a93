//! Reference fungible token
//!
//! Balances, allowances and supply live in ledger storage at the slots a
//! Solidity ERC-20 would use (mappings at slots 0 and 1, supply at slot 2).

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolError, SolInterface, SolValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abi::IERC20::{self, IERC20Calls};
use crate::chain::{Contract, Frame};

const BALANCES_SLOT: u64 = 0;
const ALLOWANCES_SLOT: u64 = 1;
const TOTAL_SUPPLY_SLOT: B256 = B256::with_last_byte(2);

/// Events emitted by [`Erc20Token`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
}

/// ERC-20 token with a fixed supply minted at deployment
#[derive(Debug, Clone)]
pub struct Erc20Token {
    name: String,
    symbol: String,
    decimals: u8,
    initial_supply: U256,
    initial_holder: Address,
}

impl Erc20Token {
    /// # Arguments
    /// * `initial_supply` - Supply in base units, minted to `initial_holder`
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        initial_supply: U256,
        initial_holder: Address,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            initial_supply,
            initial_holder,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    fn transfer(
        &self,
        frame: &mut Frame<'_>,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Bytes> {
        if from == Address::ZERO {
            return Err(revert(IERC20::ERC20InvalidSender { sender: from }));
        }
        if to == Address::ZERO {
            return Err(revert(IERC20::ERC20InvalidReceiver { receiver: to }));
        }

        let from_balance = frame.sload(balance_slot(from));
        if from_balance < amount {
            return Err(revert(IERC20::ERC20InsufficientBalance {
                sender: from,
                balance: from_balance,
                needed: amount,
            }));
        }

        frame.sstore(balance_slot(from), from_balance - amount);
        let to_balance = frame.sload(balance_slot(to));
        frame.sstore(balance_slot(to), to_balance + amount);

        debug!("{}: {} units {} -> {}", self.symbol, amount, from, to);
        frame.log(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }

    fn spend_allowance(
        &self,
        frame: &mut Frame<'_>,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Bytes> {
        let current = frame.sload(allowance_slot(owner, spender));
        if current == U256::MAX {
            return Ok(());
        }
        if current < amount {
            return Err(revert(IERC20::ERC20InsufficientAllowance {
                spender,
                allowance: current,
                needed: amount,
            }));
        }
        frame.sstore(allowance_slot(owner, spender), current - amount);
        Ok(())
    }
}

impl Contract for Erc20Token {
    fn call(&self, frame: &mut Frame<'_>, input: &[u8]) -> Result<Bytes, Bytes> {
        // Not payable, no receive.
        if !frame.value().is_zero() {
            return Err(Bytes::new());
        }
        let call = IERC20Calls::abi_decode(input, true).map_err(|_| Bytes::new())?;
        let caller = frame.caller();

        let output = match call {
            IERC20Calls::name(_) => IERC20::nameCall::abi_encode_returns(&(self.name.clone(),)),
            IERC20Calls::symbol(_) => {
                IERC20::symbolCall::abi_encode_returns(&(self.symbol.clone(),))
            }
            IERC20Calls::decimals(_) => IERC20::decimalsCall::abi_encode_returns(&(self.decimals,)),
            IERC20Calls::totalSupply(_) => {
                IERC20::totalSupplyCall::abi_encode_returns(&(frame.sload(TOTAL_SUPPLY_SLOT),))
            }
            IERC20Calls::balanceOf(c) => {
                IERC20::balanceOfCall::abi_encode_returns(&(frame.sload(balance_slot(c.account)),))
            }
            IERC20Calls::transfer(c) => {
                self.transfer(frame, caller, c.to, c.amount)?;
                IERC20::transferCall::abi_encode_returns(&(true,))
            }
            IERC20Calls::allowance(c) => IERC20::allowanceCall::abi_encode_returns(&(
                frame.sload(allowance_slot(c.owner, c.spender)),
            )),
            IERC20Calls::approve(c) => {
                if c.spender == Address::ZERO {
                    return Err(Bytes::new());
                }
                frame.sstore(allowance_slot(caller, c.spender), c.amount);
                frame.log(TokenEvent::Approval {
                    owner: caller,
                    spender: c.spender,
                    value: c.amount,
                });
                IERC20::approveCall::abi_encode_returns(&(true,))
            }
            IERC20Calls::transferFrom(c) => {
                self.spend_allowance(frame, c.from, caller, c.amount)?;
                self.transfer(frame, c.from, c.to, c.amount)?;
                IERC20::transferFromCall::abi_encode_returns(&(true,))
            }
        };
        Ok(output.into())
    }

    fn deployed(&self, frame: &mut Frame<'_>) -> Result<(), Bytes> {
        if self.initial_holder == Address::ZERO {
            return Err(revert(IERC20::ERC20InvalidReceiver {
                receiver: Address::ZERO,
            }));
        }

        frame.sstore(TOTAL_SUPPLY_SLOT, self.initial_supply);
        frame.sstore(balance_slot(self.initial_holder), self.initial_supply);
        frame.log(TokenEvent::Transfer {
            from: Address::ZERO,
            to: self.initial_holder,
            value: self.initial_supply,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Storage slot of `balances[account]`
pub fn balance_slot(account: Address) -> B256 {
    keccak256((account, U256::from(BALANCES_SLOT)).abi_encode())
}

/// Storage slot of `allowances[owner][spender]`
pub fn allowance_slot(owner: Address, spender: Address) -> B256 {
    let inner = keccak256((owner, U256::from(ALLOWANCES_SLOT)).abi_encode());
    keccak256((spender, inner).abi_encode())
}

fn revert(error: impl SolError) -> Bytes {
    error.abi_encode().into()
}
