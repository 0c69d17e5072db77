use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("No wallet provider available")]
    NoProvider,

    #[error("Request rejected by user")]
    UserRejected,

    #[error("Not connected: an authenticated session is required")]
    NotAuthenticated,

    #[error("Cannot resolve asset: unknown symbol {0:?}")]
    ResolutionFailed(String),

    #[error("Execution reverted: {0}")]
    OnChainReverted(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Balance query for {symbol} failed: {source}")]
    BalanceQuery {
        symbol: String,
        #[source]
        source: Box<BankError>,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl From<chain_eth::error::EthError> for BankError {
    fn from(e: chain_eth::error::EthError) -> Self {
        match e {
            chain_eth::error::EthError::InvalidAmount(msg) => BankError::InvalidAmount(msg),
            other => BankError::Encoding(other.to_string()),
        }
    }
}

impl From<ProviderError> for BankError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Rejected(_) => BankError::UserRejected,
            ProviderError::Reverted(reason) => BankError::OnChainReverted(reason),
            ProviderError::Unavailable(reason) => BankError::NetworkUnavailable(reason),
            other => BankError::Provider(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BankError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chain_eth::error::EthError;

    #[test]
    fn rejection_maps_to_user_rejected() {
        let err: BankError = ProviderError::Rejected("denied".into()).into();
        assert!(matches!(err, BankError::UserRejected));
    }

    #[test]
    fn revert_keeps_reason() {
        let err: BankError = ProviderError::Reverted("insufficient allowance".into()).into();
        assert_eq!(err.to_string(), "Execution reverted: insufficient allowance");
    }

    #[test]
    fn unavailable_maps_to_network() {
        let err: BankError = ProviderError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, BankError::NetworkUnavailable(_)));
    }

    #[test]
    fn unit_errors_become_invalid_amount() {
        let err: BankError = EthError::InvalidAmount("abc".into()).into();
        assert!(matches!(err, BankError::InvalidAmount(_)));
    }

    #[test]
    fn other_eth_errors_become_encoding() {
        let err: BankError = EthError::InvalidSymbol("too long".into()).into();
        assert!(matches!(err, BankError::Encoding(_)));
    }

    #[test]
    fn balance_query_names_symbol() {
        let err = BankError::BalanceQuery {
            symbol: "Shib".into(),
            source: Box::new(BankError::NetworkUnavailable("timeout".into())),
        };
        assert_eq!(
            err.to_string(),
            "Balance query for Shib failed: Network unavailable: timeout"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
