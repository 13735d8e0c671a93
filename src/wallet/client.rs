//! Caller-side wallet operations
//!
//! Builds `IContractWallet` payloads and submits them to the ledger on behalf
//! of an external account.

use std::rc::Rc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::{debug, info};

use crate::abi::IContractWallet;
use crate::chain::{Ledger, Receipt};
use crate::error::Result;

use super::engine::WalletEngine;
use super::types::OwnerConfig;

/// Handle to a deployed wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletClient {
    pub address: Address,
}

impl WalletClient {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Deploy a new wallet
    ///
    /// # Arguments
    /// * `deployer` - Account paying for the deployment, its nonce picks the address
    /// * `owner` - Sole controller of the wallet, fixed for its lifetime
    pub fn deploy(ledger: &mut Ledger, deployer: Address, owner: Address) -> Result<Self> {
        let engine = WalletEngine::new(OwnerConfig::new(owner));
        let address = ledger.deploy(deployer, Rc::new(engine))?;
        info!("Wallet for owner {} deployed at {}", owner, address);
        Ok(Self::new(address))
    }

    /// Read the owner through the wallet's `owner()` entry point
    pub fn owner(&self, ledger: &mut Ledger) -> Result<Address> {
        let output = ledger.view(
            self.address,
            IContractWallet::ownerCall {}.abi_encode().into(),
        )?;
        Ok(IContractWallet::ownerCall::abi_decode_returns(&output, true)?._0)
    }

    /// Native balance held by the wallet in wei
    pub fn balance(&self, ledger: &Ledger) -> U256 {
        ledger.balance(self.address)
    }

    /// Send native currency to the wallet (anyone may deposit)
    pub fn deposit(&self, ledger: &mut Ledger, from: Address, amount: U256) -> Result<Receipt> {
        debug!("Depositing {} wei from {} into {}", amount, from, self.address);
        ledger.transact(from, self.address, amount, Bytes::new())
    }

    /// Ask the wallet to pay `amount` wei to `recipient`
    pub fn transfer_native(
        &self,
        ledger: &mut Ledger,
        from: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<Receipt> {
        let payload = IContractWallet::transferNativeCall { recipient, amount }.abi_encode();
        ledger.transact(from, self.address, U256::ZERO, payload.into())
    }

    /// Ask the wallet to move `amount` base units of `token` to `recipient`
    pub fn transfer_token(
        &self,
        ledger: &mut Ledger,
        from: Address,
        token: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<Receipt> {
        let payload = IContractWallet::transferTokenCall {
            token,
            recipient,
            amount,
        }
        .abi_encode();
        ledger.transact(from, self.address, U256::ZERO, payload.into())
    }

    /// Forward an arbitrary call through the wallet
    ///
    /// # Returns
    /// The target's return data together with the receipt
    pub fn execute(
        &self,
        ledger: &mut Ledger,
        from: Address,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<(Bytes, Receipt)> {
        let payload = IContractWallet::executeCall {
            target,
            value,
            data,
        }
        .abi_encode();
        let receipt = ledger.transact(from, self.address, U256::ZERO, payload.into())?;
        let output = IContractWallet::executeCall::abi_decode_returns(&receipt.output, true)?._0;
        Ok((output, receipt))
    }
}
