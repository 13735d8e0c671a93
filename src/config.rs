//! Configuration loading and validation

use alloy_primitives::U256;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::chain::LedgerConfig;
use crate::units::{ether, token_units};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Host ledger settings
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSection {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Native currency (in ether) credited to every demo account
    #[serde(default = "default_genesis_balance")]
    pub genesis_balance: String,
}

impl LedgerSection {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            chain_id: self.chain_id,
            max_call_depth: self.max_call_depth,
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            max_call_depth: default_max_call_depth(),
            genesis_balance: default_genesis_balance(),
        }
    }
}

/// Amounts replayed by the `scenario` command
///
/// Native amounts are in ether, token amounts in whole tokens (fractions
/// allowed up to the token's decimals).
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Sent into the wallet by an outside account
    #[serde(default = "default_deposit")]
    pub deposit: String,
    /// Paid out by the wallet to the recipient
    #[serde(default = "default_native_transfer")]
    pub native_transfer: String,
    /// Supply of each demo token, minted to the owner
    #[serde(default = "default_token_supply")]
    pub token_supply: u64,
    /// TKNA and TKNC the owner moves into the wallet before the token steps
    #[serde(default = "default_token_deposit")]
    pub token_deposit: String,
    /// TKNB the owner moves into the wallet; it stays there
    #[serde(default = "default_token_b_deposit")]
    pub token_b_deposit: String,
    /// Sent through `transferToken` twice, to the owner then to the recipient
    #[serde(default = "default_token_transfer")]
    pub token_transfer: String,
    /// Sent to the recipient through `execute`
    #[serde(default = "default_execute_transfer")]
    pub execute_transfer: String,
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            deposit: default_deposit(),
            native_transfer: default_native_transfer(),
            token_supply: default_token_supply(),
            token_deposit: default_token_deposit(),
            token_b_deposit: default_token_b_deposit(),
            token_transfer: default_token_transfer(),
            execute_transfer: default_execute_transfer(),
            token_decimals: default_token_decimals(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// Default value functions
fn default_chain_id() -> u64 {
    31337
}
fn default_max_call_depth() -> usize {
    1024
}
fn default_genesis_balance() -> String {
    "10000".to_string()
}
fn default_deposit() -> String {
    "1.0007".to_string()
}
fn default_native_transfer() -> String {
    "0.0001".to_string()
}
fn default_token_supply() -> u64 {
    100
}
fn default_token_deposit() -> String {
    "10".to_string()
}
fn default_token_b_deposit() -> String {
    "20".to_string()
}
fn default_token_transfer() -> String {
    "5".to_string()
}
fn default_execute_transfer() -> String {
    "5.0045".to_string()
}
fn default_token_decimals() -> u8 {
    18
}
fn default_log_filter() -> String {
    "contract_wallet=info".to_string()
}

impl Config {
    /// Load configuration from file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("ledger.chain_id", default_chain_id() as i64)?
            .set_default("ledger.max_call_depth", default_max_call_depth() as i64)?
            .set_default("ledger.genesis_balance", default_genesis_balance())?
            .set_default("logging.filter", default_log_filter())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (WALLET__SECTION__KEY)
            .add_source(
                config::Environment::with_prefix("WALLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ledger.max_call_depth == 0 {
            anyhow::bail!("max_call_depth must be positive");
        }

        let genesis = parse_ether("genesis_balance", &self.ledger.genesis_balance)?;

        // Native amounts
        let deposit = parse_ether("deposit", &self.scenario.deposit)?;
        let native_transfer = parse_ether("native_transfer", &self.scenario.native_transfer)?;
        if deposit > genesis {
            anyhow::bail!("deposit cannot exceed genesis_balance");
        }
        if native_transfer > deposit {
            anyhow::bail!("native_transfer cannot exceed deposit");
        }

        // Token amounts
        let decimals = self.scenario.token_decimals;
        if self.scenario.token_supply == 0 {
            anyhow::bail!("token_supply must be positive");
        }
        let supply = crate::units::whole_tokens(U256::from(self.scenario.token_supply), decimals)
            .context("token_supply overflows at the configured decimals")?;
        let token_deposit = parse_tokens("token_deposit", &self.scenario.token_deposit, decimals)?;
        let token_b_deposit =
            parse_tokens("token_b_deposit", &self.scenario.token_b_deposit, decimals)?;
        let token_transfer =
            parse_tokens("token_transfer", &self.scenario.token_transfer, decimals)?;
        let execute_transfer =
            parse_tokens("execute_transfer", &self.scenario.execute_transfer, decimals)?;

        if token_deposit > supply {
            anyhow::bail!("token_deposit cannot exceed token_supply");
        }
        if token_b_deposit > supply {
            anyhow::bail!("token_b_deposit cannot exceed token_supply");
        }
        // TKNA leaves the wallet twice.
        if token_transfer
            .checked_mul(U256::from(2u64))
            .map_or(true, |total| total > token_deposit)
        {
            anyhow::bail!("twice token_transfer cannot exceed token_deposit");
        }
        if execute_transfer > token_deposit {
            anyhow::bail!("execute_transfer cannot exceed token_deposit");
        }

        if self.logging.filter.trim().is_empty() {
            tracing::warn!("Empty logging filter, falling back to RUST_LOG only");
        }

        Ok(())
    }

    /// Get configuration for display
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Ledger:
    chain_id: {}
    max_call_depth: {}
    genesis_balance: {} ETH
  Scenario:
    deposit: {} ETH
    native_transfer: {} ETH
    token_supply: {} tokens ({} decimals)
    token_deposit: {}
    token_b_deposit: {}
    token_transfer: {}
    execute_transfer: {}
  Logging:
    filter: {}
    json: {}
"#,
            self.ledger.chain_id,
            self.ledger.max_call_depth,
            self.ledger.genesis_balance,
            self.scenario.deposit,
            self.scenario.native_transfer,
            self.scenario.token_supply,
            self.scenario.token_decimals,
            self.scenario.token_deposit,
            self.scenario.token_b_deposit,
            self.scenario.token_transfer,
            self.scenario.execute_transfer,
            self.logging.filter,
            self.logging.json,
        )
    }
}

fn parse_ether(field: &str, value: &str) -> Result<U256> {
    ether(value).with_context(|| format!("Invalid {}: {}", field, value))
}

fn parse_tokens(field: &str, value: &str, decimals: u8) -> Result<U256> {
    token_units(value, decimals).with_context(|| format!("Invalid {}: {}", field, value))
}
