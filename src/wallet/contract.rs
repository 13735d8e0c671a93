//! On-ledger entry point of the wallet
//!
//! Decodes `IContractWallet` calls, routes them to [`WalletEngine`] and turns
//! rejections into ABI revert data. An empty payload is a deposit.

use alloy_primitives::Bytes;
use alloy_sol_types::{SolCall, SolInterface};
use tracing::debug;

use crate::abi::IContractWallet::{self, IContractWalletCalls};
use crate::chain::{Contract, Frame};

use super::engine::WalletEngine;

impl Contract for WalletEngine {
    fn call(&self, frame: &mut Frame<'_>, input: &[u8]) -> Result<Bytes, Bytes> {
        if input.is_empty() {
            let amount = frame.value();
            self.receive(frame, amount);
            return Ok(Bytes::new());
        }

        let call = IContractWalletCalls::abi_decode(input, true).map_err(|e| {
            debug!("Unrecognized wallet call: {}", e);
            Bytes::new()
        })?;

        let outcome = match call {
            IContractWalletCalls::owner(_) => Ok(IContractWallet::ownerCall::abi_encode_returns(
                &(self.owner(),),
            )),
            IContractWalletCalls::transferNative(c) => self
                .transfer_native(frame, c.recipient, c.amount)
                .map(|_| Vec::new()),
            IContractWalletCalls::transferToken(c) => self
                .transfer_token(frame, c.token, c.recipient, c.amount)
                .map(|_| Vec::new()),
            IContractWalletCalls::execute(c) => self
                .execute(frame, c.target, c.value, c.data)
                .map(|result| IContractWallet::executeCall::abi_encode_returns(&(result,))),
        };

        outcome.map(Bytes::from).map_err(|e| e.to_revert_data())
    }

    fn name(&self) -> &str {
        "ContractWallet"
    }
}
