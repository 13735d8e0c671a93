//! Token factory collaborator

use std::rc::Rc;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolInterface};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::abi::IERC20TokenFactory::{self, IERC20TokenFactoryCalls};
use crate::chain::{Contract, Frame};
use crate::units::whole_tokens;

use super::erc20::Erc20Token;

/// Events emitted by [`Erc20TokenFactory`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum FactoryEvent {
    #[serde(rename = "ERC20TokenCreated")]
    Erc20TokenCreated { token_address: Address },
}

/// Deploys [`Erc20Token`]s whose whole supply goes to the factory's caller
#[derive(Debug, Default, Clone, Copy)]
pub struct Erc20TokenFactory;

impl Contract for Erc20TokenFactory {
    fn call(&self, frame: &mut Frame<'_>, input: &[u8]) -> Result<Bytes, Bytes> {
        let IERC20TokenFactoryCalls::deployNewERC20Token(c) =
            IERC20TokenFactoryCalls::abi_decode(input, true).map_err(|_| Bytes::new())?;

        // Supply is given in whole tokens.
        let supply = whole_tokens(c.initialSupply, c.decimals).ok_or_else(Bytes::new)?;
        let token = Erc20Token::new(c.name, c.symbol, c.decimals, supply, frame.caller());
        let symbol = token.symbol().to_string();

        let token_address = frame.deploy(Rc::new(token))?;
        info!("Factory created {} at {}", symbol, token_address);
        frame.log(FactoryEvent::Erc20TokenCreated { token_address });

        Ok(IERC20TokenFactory::deployNewERC20TokenCall::abi_encode_returns(&(token_address,)).into())
    }

    fn name(&self) -> &str {
        "ERC20TokenFactory"
    }
}
