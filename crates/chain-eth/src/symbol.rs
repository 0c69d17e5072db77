use alloy_primitives::B256;

use crate::error::EthError;

/// Longest symbol that still leaves a terminating zero byte in the word.
pub const MAX_SYMBOL_BYTES: usize = 31;

/// Encodes a short string as a right zero-padded `bytes32`.
///
/// The string must be at most 31 UTF-8 bytes so the word always carries a
/// terminating zero byte.
pub fn encode_symbol(symbol: &str) -> Result<B256, EthError> {
    let bytes = symbol.as_bytes();
    if bytes.len() > MAX_SYMBOL_BYTES {
        return Err(EthError::InvalidSymbol(format!(
            "{symbol:?} is {} bytes, at most {MAX_SYMBOL_BYTES} fit in bytes32",
            bytes.len()
        )));
    }

    let mut word = [0u8; 32];
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(word))
}

/// Decodes a right zero-padded `bytes32` back into a string.
///
/// Reads up to the first zero byte. A word with no terminating zero is
/// rejected, as is invalid UTF-8.
pub fn decode_symbol(word: &B256) -> Result<String, EthError> {
    let bytes = word.as_slice();
    if bytes[MAX_SYMBOL_BYTES] != 0 {
        return Err(EthError::InvalidSymbol(
            "bytes32 string is not null-terminated".into(),
        ));
    }

    let end = bytes.iter().position(|&b| b == 0).unwrap_or(MAX_SYMBOL_BYTES);
    String::from_utf8(bytes[..end].to_vec())
        .map_err(|e| EthError::InvalidSymbol(format!("invalid utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_right() {
        let word = encode_symbol("Eth").unwrap();
        assert_eq!(&word[..3], b"Eth");
        assert_eq!(&word[3..], &[0u8; 29]);
    }

    #[test]
    fn decode_stops_at_first_zero() {
        let word = encode_symbol("Usdt").unwrap();
        assert_eq!(decode_symbol(&word).unwrap(), "Usdt");
    }

    #[test]
    fn empty_symbol_is_zero_word() {
        assert_eq!(encode_symbol("").unwrap(), B256::ZERO);
        assert_eq!(decode_symbol(&B256::ZERO).unwrap(), "");
    }

    #[test]
    fn max_length_symbol_fits() {
        let symbol = "A".repeat(MAX_SYMBOL_BYTES);
        let word = encode_symbol(&symbol).unwrap();
        assert_eq!(decode_symbol(&word).unwrap(), symbol);
    }

    #[test]
    fn too_long_symbol_is_rejected() {
        assert!(encode_symbol(&"A".repeat(32)).is_err());
    }

    #[test]
    fn multibyte_utf8_survives() {
        let word = encode_symbol("Ξther").unwrap();
        assert_eq!(decode_symbol(&word).unwrap(), "Ξther");
    }

    #[test]
    fn unterminated_word_is_rejected() {
        let word = B256::repeat_byte(b'A');
        assert!(decode_symbol(&word).is_err());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut raw = [0u8; 32];
        raw[0] = 0xff;
        assert!(decode_symbol(&B256::from(raw)).is_err());
    }

    #[test]
    fn matches_known_hardhat_encoding() {
        // formatBytes32String("Matic")
        let word = encode_symbol("Matic").unwrap();
        assert_eq!(
            hex::encode(word),
            "4d61746963000000000000000000000000000000000000000000000000000000"
        );
    }
}
