//! CLI command implementations

use std::rc::Rc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolError};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::abi::IContractWallet;
use crate::chain::{Ledger, Receipt};
use crate::config::Config;
use crate::token::{Erc20TokenFactory, FactoryClient, TokenClient};
use crate::units::{ether, from_token_units, to_ether, token_units};
use crate::wallet::{WalletClient, WalletEvent};

/// Well-known demo accounts
const OWNER: Address = Address::repeat_byte(0x01);
const DEPOSITOR: Address = Address::repeat_byte(0x02);
const RECIPIENT: Address = Address::repeat_byte(0x03);

/// One transaction of the scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioStep {
    pub name: String,
    pub receipt: Receipt,
}

/// Balance of one holder in one asset, formatted in whole units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceLine {
    pub holder: String,
    pub asset: String,
    pub amount: String,
}

/// Everything the scenario did, in order
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub chain_id: u64,
    pub owner: Address,
    pub depositor: Address,
    pub recipient: Address,
    pub wallet: Address,
    pub tokens: Vec<(String, Address)>,
    pub steps: Vec<ScenarioStep>,
    pub balances: Vec<BalanceLine>,
}

impl ScenarioReport {
    /// Audit trail emitted by the wallet across all steps
    pub fn audit_trail(&self) -> Vec<&WalletEvent> {
        self.steps
            .iter()
            .flat_map(|step| step.receipt.wallet_events())
            .collect()
    }

    pub fn balance(&self, holder: &str, asset: &str) -> Option<&str> {
        self.balances
            .iter()
            .find(|line| line.holder == holder && line.asset == asset)
            .map(|line| line.amount.as_str())
    }
}

/// Replay the end-to-end wallet scenario on a fresh ledger
pub fn scenario(config: &Config, json: bool) -> Result<()> {
    let report = run_scenario(config)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        return Ok(());
    }

    println!("\n=== CONTRACT WALLET SCENARIO ===\n");
    println!("Chain ID:  {}", report.chain_id);
    println!("Owner:     {}", report.owner);
    println!("Depositor: {}", report.depositor);
    println!("Recipient: {}", report.recipient);
    println!("Wallet:    {}", report.wallet);
    for (symbol, address) in &report.tokens {
        println!("{:<10} {}", format!("{}:", symbol), address);
    }

    println!("\n--- Steps ---\n");
    for (i, step) in report.steps.iter().enumerate() {
        println!(
            "{:>2}. {:<40} nonce {} ({} logs)",
            i + 1,
            step.name,
            step.receipt.nonce,
            step.receipt.logs.len()
        );
    }

    println!("\n--- Audit Trail ---\n");
    for event in report.audit_trail() {
        println!("  {}", event);
    }

    println!("\n--- Final Balances ---\n");
    println!("{:<12} {:<8} {:>24}", "Holder", "Asset", "Amount");
    println!("{}", "-".repeat(46));
    for line in &report.balances {
        println!("{:<12} {:<8} {:>24}", line.holder, line.asset, line.amount);
    }
    println!();

    Ok(())
}

/// Run the scenario and collect its receipts and final balances
pub fn run_scenario(config: &Config) -> Result<ScenarioReport> {
    let scenario = &config.scenario;
    let decimals = scenario.token_decimals;

    let mut ledger = Ledger::new(config.ledger.ledger_config());
    let genesis = ether(&config.ledger.genesis_balance)?;
    for account in [OWNER, DEPOSITOR, RECIPIENT] {
        ledger.fund(account, genesis)?;
    }

    // Collaborators
    let factory = FactoryClient::new(
        ledger
            .deploy(OWNER, Rc::new(Erc20TokenFactory))
            .context("Failed to deploy token factory")?,
    );
    let mut tokens = Vec::new();
    for (name, symbol) in [("Token A", "TKNA"), ("Token B", "TKNB"), ("Token C", "TKNC")] {
        let token = factory
            .create_token(&mut ledger, OWNER, name, symbol, decimals, scenario.token_supply)
            .with_context(|| format!("Failed to create {}", symbol))?;
        debug!("Created {} at {}", symbol, token.address);
        tokens.push((symbol.to_string(), token));
    }
    let token_a = tokens[0].1;
    let token_b = tokens[1].1;
    let token_c = tokens[2].1;

    let wallet = WalletClient::deploy(&mut ledger, OWNER, OWNER).context("Failed to deploy wallet")?;
    info!("Scenario wallet at {}", wallet.address);

    let mut steps = Vec::new();
    let mut record = |name: String, receipt: Receipt| {
        steps.push(ScenarioStep { name, receipt });
    };

    // Native currency
    let deposit = ether(&scenario.deposit)?;
    record(
        format!("Deposit {} ETH", scenario.deposit),
        wallet.deposit(&mut ledger, DEPOSITOR, deposit)?,
    );

    let native_transfer = ether(&scenario.native_transfer)?;
    record(
        format!("transferNative {} ETH", scenario.native_transfer),
        wallet
            .transfer_native(&mut ledger, OWNER, RECIPIENT, native_transfer)
            .context("transferNative failed")?,
    );

    // Tokens
    let token_deposit = token_units(&scenario.token_deposit, decimals)?;
    let token_b_deposit = token_units(&scenario.token_b_deposit, decimals)?;
    for (token, amount, shown) in [
        (token_a, token_deposit, &scenario.token_deposit),
        (token_b, token_b_deposit, &scenario.token_b_deposit),
    ] {
        let symbol = token.symbol(&mut ledger)?;
        record(
            format!("Fund wallet with {} {}", shown, symbol),
            token.transfer(&mut ledger, OWNER, wallet.address, amount)?,
        );
    }

    let token_transfer = token_units(&scenario.token_transfer, decimals)?;
    for (label, recipient) in [("owner", OWNER), ("recipient", RECIPIENT)] {
        record(
            format!("transferToken {} TKNA to {}", scenario.token_transfer, label),
            wallet
                .transfer_token(&mut ledger, OWNER, token_a.address, recipient, token_transfer)
                .with_context(|| format!("transferToken to {} failed", label))?,
        );
    }

    record(
        format!("Fund wallet with {} TKNC", scenario.token_deposit),
        token_c.transfer(&mut ledger, OWNER, wallet.address, token_deposit)?,
    );

    let execute_transfer = token_units(&scenario.execute_transfer, decimals)?;
    let (_, receipt) = wallet
        .execute(
            &mut ledger,
            OWNER,
            token_c.address,
            U256::ZERO,
            TokenClient::transfer_payload(RECIPIENT, execute_transfer),
        )
        .context("execute failed")?;
    record(
        format!("execute TKNC.transfer {}", scenario.execute_transfer),
        receipt,
    );

    // Final balances
    let holders = [
        ("owner", OWNER),
        ("recipient", RECIPIENT),
        ("wallet", wallet.address),
    ];
    let mut balances = Vec::new();
    for (holder, address) in holders {
        balances.push(BalanceLine {
            holder: holder.to_string(),
            asset: "ETH".to_string(),
            amount: to_ether(ledger.balance(address)),
        });
        for (symbol, token) in &tokens {
            balances.push(BalanceLine {
                holder: holder.to_string(),
                asset: symbol.clone(),
                amount: from_token_units(token.balance_of(&mut ledger, address)?, decimals)?,
            });
        }
    }

    Ok(ScenarioReport {
        chain_id: ledger.config().chain_id,
        owner: OWNER,
        depositor: DEPOSITOR,
        recipient: RECIPIENT,
        wallet: wallet.address,
        tokens: tokens
            .iter()
            .map(|(symbol, token)| (symbol.clone(), token.address))
            .collect(),
        steps,
        balances,
    })
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Print the wallet's entry points and errors with their selectors
pub fn abi() -> Result<()> {
    println!("\n=== CONTRACT WALLET ABI ===\n");

    println!("Functions:");
    for (selector, signature) in function_selectors() {
        println!("  0x{}  {}", alloy_primitives::hex::encode(selector), signature);
    }

    println!("\nErrors:");
    for (selector, signature) in error_selectors() {
        println!("  0x{}  {}", alloy_primitives::hex::encode(selector), signature);
    }
    println!();

    Ok(())
}

fn function_selectors() -> Vec<([u8; 4], &'static str)> {
    use IContractWallet::*;
    vec![
        (ownerCall::SELECTOR, ownerCall::SIGNATURE),
        (transferNativeCall::SELECTOR, transferNativeCall::SIGNATURE),
        (transferTokenCall::SELECTOR, transferTokenCall::SIGNATURE),
        (executeCall::SELECTOR, executeCall::SIGNATURE),
    ]
}

fn error_selectors() -> Vec<([u8; 4], &'static str)> {
    use IContractWallet::*;
    vec![
        (Unauthorized::SELECTOR, Unauthorized::SIGNATURE),
        (ZeroAddress::SELECTOR, ZeroAddress::SIGNATURE),
        (InsufficientBalance::SELECTOR, InsufficientBalance::SIGNATURE),
        (TransferRejected::SELECTOR, TransferRejected::SIGNATURE),
        (ExternalCallFailed::SELECTOR, ExternalCallFailed::SIGNATURE),
        (ReentrancyRejected::SELECTOR, ReentrancyRejected::SIGNATURE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_scenario_balances() {
        let report = run_scenario(&Config::default()).unwrap();

        assert_eq!(report.balance("wallet", "ETH"), Some("1.000600000000000000"));
        assert_eq!(report.balance("recipient", "ETH"), Some("10000.000100000000000000"));
        assert_eq!(report.balance("owner", "TKNA"), Some("95.000000000000000000"));
        assert_eq!(report.balance("recipient", "TKNA"), Some("5.000000000000000000"));
        assert_eq!(report.balance("wallet", "TKNA"), Some("0.000000000000000000"));
        assert_eq!(report.balance("owner", "TKNB"), Some("80.000000000000000000"));
        assert_eq!(report.balance("wallet", "TKNB"), Some("20.000000000000000000"));
        assert_eq!(report.balance("owner", "TKNC"), Some("90.000000000000000000"));
        assert_eq!(report.balance("recipient", "TKNC"), Some("5.004500000000000000"));
        assert_eq!(report.balance("wallet", "TKNC"), Some("4.995500000000000000"));
    }

    #[test]
    fn test_default_scenario_audit_trail() {
        let report = run_scenario(&Config::default()).unwrap();
        let trail = report.audit_trail();

        assert_eq!(trail.len(), 4);
        assert!(matches!(trail[0], WalletEvent::NativeTransferred { recipient, .. } if *recipient == RECIPIENT));
        assert!(matches!(trail[1], WalletEvent::TokenTransferred { recipient, .. } if *recipient == OWNER));
        assert!(matches!(trail[2], WalletEvent::TokenTransferred { recipient, .. } if *recipient == RECIPIENT));

        let WalletEvent::ExecutedTransaction { target, result, .. } = trail[3] else {
            panic!("unexpected event: {}", trail[3]);
        };
        assert_eq!(*target, report.tokens[2].1);
        let accepted = crate::abi::IERC20::transferCall::abi_decode_returns(result, true).unwrap();
        assert!(accepted._0);
    }

    #[test]
    fn test_report_serializes() {
        let report = run_scenario(&Config::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["chain_id"], 31337);
        assert_eq!(json["steps"].as_array().unwrap().len(), 8);
        assert!(json["steps"][1]["receipt"]["logs"][0]["event"]["wallet"]["event"]
            .as_str()
            .unwrap()
            .contains("NativeTransferred"));
    }

    #[test]
    fn test_selectors_unique() {
        let functions: HashSet<_> = function_selectors().into_iter().map(|(s, _)| s).collect();
        let errors: HashSet<_> = error_selectors().into_iter().map(|(s, _)| s).collect();

        assert_eq!(functions.len(), 4);
        assert_eq!(errors.len(), 6);
    }
}
