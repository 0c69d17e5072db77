/// Minimal ABI encoding and decoding for EVM function calls.
///
/// This module provides just enough ABI support to talk to the bank ledger
/// and ERC-20 token contracts without pulling in a full ABI parser: static
/// 32-byte parameters on the way in, single words and `bytes32[]` on the way
/// out.
use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Size of a single ABI word.
pub const WORD: usize = 32;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
    /// A `bytes32` value, already exactly one word wide.
    FixedBytes32(B256),
}

/// Computes the 4-byte selector of a canonical function signature such as
/// `"approve(address,uint256)"`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Encodes a function call with the given 4-byte selector and ABI parameters.
///
/// The output is `selector || encode(params[0]) || encode(params[1]) || ...`
/// where each parameter is encoded as a 32-byte ABI word.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * WORD);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

/// Encodes a single [`AbiParam`] as a 32-byte ABI word.
fn encode_param(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<32>(),
        AbiParam::FixedBytes32(bytes) => bytes.0,
    }
}

/// Returns the `index`-th word of `data`, or a decoding error if the data is
/// too short.
fn word_at(data: &[u8], index: usize) -> Result<&[u8], EthError> {
    let end = index
        .checked_mul(WORD)
        .and_then(|start| start.checked_add(WORD))
        .ok_or_else(|| EthError::DecodingError(format!("word index {index} out of range")))?;
    data.get(end - WORD..end).ok_or_else(|| {
        EthError::DecodingError(format!(
            "expected at least {end} bytes, got {}",
            data.len()
        ))
    })
}

/// Interprets an ABI word as an offset or length that must fit a `usize`.
fn word_to_usize(word: &[u8]) -> Result<usize, EthError> {
    if word[..24].iter().any(|&b| b != 0) {
        return Err(EthError::DecodingError("offset or length out of range".into()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(tail))
        .map_err(|_| EthError::DecodingError("offset or length out of range".into()))
}

/// Decodes a single `uint256` return value.
///
/// Extra trailing bytes are ignored.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    Ok(U256::from_be_slice(word_at(data, 0)?))
}

/// Decodes a single `address` return value.
///
/// The upper 12 bytes of the word must be zero.
pub fn decode_address(data: &[u8]) -> Result<Address, EthError> {
    let word = word_at(data, 0)?;
    if word[..12].iter().any(|&b| b != 0) {
        return Err(EthError::DecodingError(
            "address word has non-zero padding".into(),
        ));
    }
    Ok(Address::from_slice(&word[12..]))
}

/// Decodes a single dynamic `bytes32[]` return value.
///
/// Layout: `offset || ... || length || element_0 || element_1 || ...` where
/// `offset` points (in bytes) at the length word.
pub fn decode_bytes32_array(data: &[u8]) -> Result<Vec<B256>, EthError> {
    let offset = word_to_usize(word_at(data, 0)?)?;
    if offset % WORD != 0 {
        return Err(EthError::DecodingError(format!(
            "array offset {offset} is not word aligned"
        )));
    }

    let head = offset / WORD;
    let len = word_to_usize(word_at(data, head)?)?;

    // Bound the allocation by what the payload can actually hold.
    let body_start = offset
        .checked_add(WORD)
        .ok_or_else(|| EthError::DecodingError(format!("array offset {offset} out of range")))?;
    let available = data.len().saturating_sub(body_start) / WORD;
    if len > available {
        return Err(EthError::DecodingError(format!(
            "array claims {len} elements but only {available} are present"
        )));
    }

    (0..len)
        .map(|i| word_at(data, head + 1 + i).map(B256::from_slice))
        .collect()
}

/// Encodes a `bytes32[]` as a standalone return value. Used to build canned
/// responses for in-memory providers.
pub fn encode_bytes32_array(values: &[B256]) -> Vec<u8> {
    let mut data = Vec::with_capacity((2 + values.len()) * WORD);
    data.extend_from_slice(&U256::from(WORD).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(values.len()).to_be_bytes::<32>());
    for value in values {
        data.extend_from_slice(value.as_slice());
    }
    data
}

/// Encodes a single static value as a return word.
pub fn encode_word(param: &AbiParam) -> Vec<u8> {
    encode_param(param).to_vec()
}
