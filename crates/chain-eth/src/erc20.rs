use alloy_primitives::{Address, U256};

use crate::abi::{self, encode_function_call, AbiParam};
use crate::error::EthError;

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Encodes an ERC-20 `approve(address,uint256)` call.
///
/// # Parameters
///
/// - `spender`: The address allowed to pull tokens.
/// - `amount`: The approval amount in the token's smallest unit.
///
/// # Returns
///
/// The complete calldata (4-byte selector + 64 bytes of ABI-encoded params).
pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    let params = [AbiParam::Address(spender), AbiParam::Uint256(amount)];
    encode_function_call(APPROVE_SELECTOR, &params)
}

/// Recognises `approve(address,uint256)` calldata and returns
/// `(spender, amount)`. Any other selector yields `None`.
pub fn decode_approve(data: &[u8]) -> Result<Option<(Address, U256)>, EthError> {
    if data.len() < 4 || data[..4] != APPROVE_SELECTOR {
        return Ok(None);
    }
    let args = &data[4..];
    let spender = abi::decode_address(args)?;
    let amount = abi::decode_uint256(args.get(abi::WORD..).unwrap_or_default())?;
    Ok(Some((spender, amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::function_selector;

    fn spender() -> Address {
        "0x5FC8d32690cc91D4c39d9d3abcBD16989F875707".parse().unwrap()
    }

    #[test]
    fn approve_selector_matches_signature() {
        assert_eq!(APPROVE_SELECTOR, function_selector("approve(address,uint256)"));
    }

    #[test]
    fn encode_approve_correct_length() {
        let data = encode_approve(spender(), U256::ZERO);

        // 4 (selector) + 32 (address) + 32 (amount) = 68 bytes.
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], &APPROVE_SELECTOR);
    }

    #[test]
    fn encode_approve_full_calldata_matches_expected() {
        // Approve 1 token (1e18 units) for the bank contract.
        let amount = U256::from(1_000_000_000_000_000_000u64);
        let data = encode_approve(spender(), amount);

        assert_eq!(hex::encode(&data[..4]), "095ea7b3");

        let addr_hex = hex::encode(&data[4..36]);
        assert_eq!(
            addr_hex,
            "0000000000000000000000005fc8d32690cc91d4c39d9d3abcbd16989f875707"
        );

        let amount_hex = hex::encode(&data[36..68]);
        assert!(amount_hex.ends_with("0de0b6b3a7640000"));
        assert!(amount_hex.starts_with("000000000000"));
    }

    #[test]
    fn decode_approve_recovers_arguments() {
        let amount = U256::from(2_000_000u64);
        let data = encode_approve(spender(), amount);
        assert_eq!(decode_approve(&data).unwrap(), Some((spender(), amount)));
    }

    #[test]
    fn decode_approve_ignores_other_selectors() {
        assert_eq!(decode_approve(&[0xde, 0xad, 0xbe, 0xef]).unwrap(), None);
        assert_eq!(decode_approve(&[]).unwrap(), None);
    }

    #[test]
    fn decode_approve_rejects_truncated_arguments() {
        let data = encode_approve(spender(), U256::from(1u64));
        assert!(decode_approve(&data[..40]).is_err());
    }
}
