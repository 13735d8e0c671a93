//! Token collaborators
//!
//! A reference ERC-20 and the factory that deploys it. The wallet only ever
//! reaches these through forwarded calls.

pub mod client;
pub mod erc20;
pub mod factory;

pub use client::{FactoryClient, TokenClient};
pub use erc20::{Erc20Token, TokenEvent};
pub use factory::{Erc20TokenFactory, FactoryEvent};
