//! Calldata encoding and return decoding for the bank ledger contract.
//!
//! The ledger custodies native currency and whitelisted tokens per account.
//! Symbols travel as `bytes32` short strings, amounts as `uint256` in the
//! asset's smallest unit.

use alloy_primitives::{Address, U256};

use crate::abi::{self, encode_function_call, function_selector, AbiParam};
use crate::error::EthError;
use crate::symbol;

pub const GET_WHITELISTED_SYMBOLS: &str = "getWhitelistedSymbols()";
pub const GET_WHITELISTED_TOKEN_ADDRESS: &str = "getWhitelistedTokenAddress(bytes32)";
pub const GET_TOKEN_BALANCE: &str = "getTokenBalance(bytes32)";
pub const DEPOSIT_TOKENS: &str = "depositTokens(uint256,bytes32)";
pub const WITHDRAW_TOKENS: &str = "withdrawTokens(uint256,bytes32)";
pub const WITHDRAW_ETHER: &str = "withdrawEther(uint256)";

/// A decoded ledger call, used to recognise calldata on the receiving side
/// of an in-memory or recording provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    GetWhitelistedSymbols,
    GetWhitelistedTokenAddress { symbol: String },
    GetTokenBalance { symbol: String },
    DepositTokens { amount: U256, symbol: String },
    WithdrawTokens { amount: U256, symbol: String },
    WithdrawEther { amount: U256 },
}

/// Encodes `getWhitelistedSymbols()`.
pub fn encode_get_whitelisted_symbols() -> Vec<u8> {
    encode_function_call(function_selector(GET_WHITELISTED_SYMBOLS), &[])
}

/// Encodes `getWhitelistedTokenAddress(bytes32)`.
pub fn encode_get_whitelisted_token_address(symbol: &str) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::FixedBytes32(symbol::encode_symbol(symbol)?)];
    Ok(encode_function_call(
        function_selector(GET_WHITELISTED_TOKEN_ADDRESS),
        &params,
    ))
}

/// Encodes `getTokenBalance(bytes32)`. The ledger answers for `msg.sender`,
/// so the call must be issued from the account being queried.
pub fn encode_get_token_balance(symbol: &str) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::FixedBytes32(symbol::encode_symbol(symbol)?)];
    Ok(encode_function_call(function_selector(GET_TOKEN_BALANCE), &params))
}

/// Encodes `depositTokens(uint256,bytes32)`.
pub fn encode_deposit_tokens(amount: U256, symbol: &str) -> Result<Vec<u8>, EthError> {
    let params = [
        AbiParam::Uint256(amount),
        AbiParam::FixedBytes32(symbol::encode_symbol(symbol)?),
    ];
    Ok(encode_function_call(function_selector(DEPOSIT_TOKENS), &params))
}

/// Encodes `withdrawTokens(uint256,bytes32)`.
pub fn encode_withdraw_tokens(amount: U256, symbol: &str) -> Result<Vec<u8>, EthError> {
    let params = [
        AbiParam::Uint256(amount),
        AbiParam::FixedBytes32(symbol::encode_symbol(symbol)?),
    ];
    Ok(encode_function_call(function_selector(WITHDRAW_TOKENS), &params))
}

/// Encodes `withdrawEther(uint256)`.
pub fn encode_withdraw_ether(amount: U256) -> Vec<u8> {
    encode_function_call(
        function_selector(WITHDRAW_ETHER),
        &[AbiParam::Uint256(amount)],
    )
}

/// Decodes the `bytes32[]` returned by `getWhitelistedSymbols()` into text,
/// preserving order.
pub fn decode_whitelisted_symbols(data: &[u8]) -> Result<Vec<String>, EthError> {
    abi::decode_bytes32_array(data)?
        .iter()
        .map(symbol::decode_symbol)
        .collect()
}

/// Decodes the `address` returned by `getWhitelistedTokenAddress(bytes32)`.
pub fn decode_token_address(data: &[u8]) -> Result<Address, EthError> {
    abi::decode_address(data)
}

/// Decodes the `uint256` returned by `getTokenBalance(bytes32)`.
pub fn decode_token_balance(data: &[u8]) -> Result<U256, EthError> {
    abi::decode_uint256(data)
}

/// Recognises ledger calldata. Returns `None` for an unknown selector.
pub fn decode_call(data: &[u8]) -> Result<Option<LedgerCall>, EthError> {
    if data.len() < 4 {
        return Err(EthError::DecodingError(format!(
            "calldata is {} bytes, shorter than a selector",
            data.len()
        )));
    }
    let (selector, args) = data.split_at(4);
    let symbol_at = |index: usize| -> Result<String, EthError> {
        let start = index * abi::WORD;
        let word = args.get(start..start + abi::WORD).ok_or_else(|| {
            EthError::DecodingError("missing bytes32 argument".into())
        })?;
        symbol::decode_symbol(&alloy_primitives::B256::from_slice(word))
    };

    let call = if selector == function_selector(GET_WHITELISTED_SYMBOLS) {
        LedgerCall::GetWhitelistedSymbols
    } else if selector == function_selector(GET_WHITELISTED_TOKEN_ADDRESS) {
        LedgerCall::GetWhitelistedTokenAddress { symbol: symbol_at(0)? }
    } else if selector == function_selector(GET_TOKEN_BALANCE) {
        LedgerCall::GetTokenBalance { symbol: symbol_at(0)? }
    } else if selector == function_selector(DEPOSIT_TOKENS) {
        LedgerCall::DepositTokens {
            amount: abi::decode_uint256(args)?,
            symbol: symbol_at(1)?,
        }
    } else if selector == function_selector(WITHDRAW_TOKENS) {
        LedgerCall::WithdrawTokens {
            amount: abi::decode_uint256(args)?,
            symbol: symbol_at(1)?,
        }
    } else if selector == function_selector(WITHDRAW_ETHER) {
        LedgerCall::WithdrawEther { amount: abi::decode_uint256(args)? }
    } else {
        return Ok(None);
    };

    Ok(Some(call))
}
