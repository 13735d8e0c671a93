//! Solidity ABI surfaces spoken on the ledger
//!
//! Call payloads and revert data are standard ABI so that payloads built here
//! are byte-identical to what an EVM toolchain would produce.

use alloy_sol_types::sol;

sol! {
    /// Fungible token collaborator.
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);

        error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);
        error ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed);
        error ERC20InvalidReceiver(address receiver);
        error ERC20InvalidSender(address sender);
    }

    /// Factory deploying [`IERC20`] collaborators.
    interface IERC20TokenFactory {
        function deployNewERC20Token(
            string name,
            string symbol,
            uint8 decimals,
            uint256 initialSupply
        ) external returns (address);
    }

    /// Entry points of the custodial wallet.
    interface IContractWallet {
        function owner() external view returns (address);
        function transferNative(address recipient, uint256 amount) external;
        function transferToken(address token, address recipient, uint256 amount) external;
        function execute(address target, uint256 value, bytes data) external payable returns (bytes);

        error Unauthorized(address caller);
        error ZeroAddress();
        error InsufficientBalance(uint256 available, uint256 required);
        error TransferRejected(address recipient, uint256 amount, bytes reason);
        error ExternalCallFailed(address target, bytes reason);
        error ReentrancyRejected();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{hex, Address, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn test_erc20_transfer_selector() {
        // transfer(address,uint256)
        assert_eq!(IERC20::transferCall::SELECTOR, hex!("a9059cbb"));
        assert_eq!(IERC20::balanceOfCall::SELECTOR, hex!("70a08231"));
    }

    #[test]
    fn test_transfer_payload_layout() {
        let call = IERC20::transferCall {
            to: Address::repeat_byte(0x11),
            amount: U256::from(5u64),
        };
        let encoded = call.abi_encode();

        assert_eq!(encoded.len(), 4 + 32 + 32);
        assert_eq!(&encoded[..4], &hex!("a9059cbb"));
        assert_eq!(&encoded[16..36], Address::repeat_byte(0x11).as_slice());
        assert_eq!(encoded[67], 5);
    }
}
