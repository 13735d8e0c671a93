//! Caller-side helpers for token collaborators
//!
//! Used by the CLI and tests to deploy tokens, read balances and build
//! payloads; the wallet engine itself never goes through these.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::abi::{IERC20, IERC20TokenFactory};
use crate::chain::{Ledger, Receipt};
use crate::error::{Error, Result};

/// Handle to a deployed [`super::Erc20TokenFactory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryClient {
    pub address: Address,
}

impl FactoryClient {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Deploy a token through the factory; `from` receives the whole supply
    ///
    /// # Arguments
    /// * `initial_supply` - Supply in whole tokens
    pub fn create_token(
        &self,
        ledger: &mut Ledger,
        from: Address,
        name: &str,
        symbol: &str,
        decimals: u8,
        initial_supply: u64,
    ) -> Result<TokenClient> {
        let payload = IERC20TokenFactory::deployNewERC20TokenCall {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            initialSupply: U256::from(initial_supply),
        }
        .abi_encode();

        let receipt = ledger.transact(from, self.address, U256::ZERO, payload.into())?;
        let address = receipt
            .created_tokens()
            .first()
            .copied()
            .ok_or_else(|| Error::NoContract(self.address))?;

        Ok(TokenClient::new(address))
    }
}

/// Handle to a deployed ERC-20 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClient {
    pub address: Address,
}

impl TokenClient {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn balance_of(&self, ledger: &mut Ledger, account: Address) -> Result<U256> {
        let output = ledger.view(
            self.address,
            IERC20::balanceOfCall { account }.abi_encode().into(),
        )?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&output, true)?._0)
    }

    pub fn decimals(&self, ledger: &mut Ledger) -> Result<u8> {
        let output = ledger.view(self.address, IERC20::decimalsCall {}.abi_encode().into())?;
        Ok(IERC20::decimalsCall::abi_decode_returns(&output, true)?._0)
    }

    pub fn symbol(&self, ledger: &mut Ledger) -> Result<String> {
        let output = ledger.view(self.address, IERC20::symbolCall {}.abi_encode().into())?;
        Ok(IERC20::symbolCall::abi_decode_returns(&output, true)?._0)
    }

    /// Send tokens from `from` directly (not through a wallet)
    pub fn transfer(
        &self,
        ledger: &mut Ledger,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Receipt> {
        ledger.transact(from, self.address, U256::ZERO, Self::transfer_payload(to, amount))
    }

    /// ABI payload of `transfer(to, amount)`, e.g. for a wallet `execute`
    pub fn transfer_payload(to: Address, amount: U256) -> Bytes {
        IERC20::transferCall { to, amount }.abi_encode().into()
    }
}
