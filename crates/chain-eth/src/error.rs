use thiserror::Error;

/// Ethereum encoding and signing errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_amount() {
        let err = EthError::InvalidAmount("not a number".into());
        assert_eq!(err.to_string(), "invalid amount: not a number");
    }

    #[test]
    fn display_invalid_symbol() {
        let err = EthError::InvalidSymbol("longer than 31 bytes".into());
        assert_eq!(err.to_string(), "invalid symbol: longer than 31 bytes");
    }

    #[test]
    fn display_decoding_error() {
        let err = EthError::DecodingError("short return data".into());
        assert_eq!(err.to_string(), "decoding error: short return data");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(EthError::InvalidPrivateKey("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
