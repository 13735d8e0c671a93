//! Native currency and token unit conversion

use alloy_primitives::utils::{format_ether, format_units, parse_ether, parse_units};
use alloy_primitives::U256;

use crate::error::{Error, Result};

/// Convert a decimal ether string ("1.0007") to wei
pub fn ether(amount: &str) -> Result<U256> {
    parse_ether(amount).map_err(|e| Error::InvalidAmount(format!("{amount}: {e}")))
}

/// Convert wei to a decimal ether string
pub fn to_ether(wei: U256) -> String {
    format_ether(wei)
}

/// Convert a decimal token amount to base units for a token with `decimals`
pub fn token_units(amount: &str, decimals: u8) -> Result<U256> {
    parse_units(amount, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| Error::InvalidAmount(format!("{amount}: {e}")))
}

/// Convert token base units to a decimal string
pub fn from_token_units(amount: U256, decimals: u8) -> Result<String> {
    Ok(format_units(amount, decimals)?)
}

/// Scale a whole-token supply by `10^decimals`
pub fn whole_tokens(amount: U256, decimals: u8) -> Option<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|scale| amount.checked_mul(scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ether_conversion() {
        assert_eq!(ether("1").unwrap(), U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(ether("1.0007").unwrap(), U256::from(1_000_700_000_000_000_000u128));
        assert_eq!(ether("0.0001").unwrap(), U256::from(100_000_000_000_000u128));
        assert!(ether("not-a-number").is_err());
    }

    #[test]
    fn test_token_units_match_ether_at_18_decimals() {
        assert_eq!(token_units("5.0045", 18).unwrap(), ether("5.0045").unwrap());
        assert_eq!(token_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_whole_tokens() {
        assert_eq!(whole_tokens(U256::from(100u64), 18), Some(ether("100").unwrap()));
        assert_eq!(whole_tokens(U256::MAX, 18), None);
    }

    #[test]
    fn test_to_ether_round_trip() {
        let wei = ether("1.0006").unwrap();
        assert!(to_ether(wei).starts_with("1.0006"));
    }
}
