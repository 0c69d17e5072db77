//! The wallet provider boundary.
//!
//! Everything the client does on-chain goes through [`WalletProvider`]:
//! read-only contract calls, the account-access prompt, and transaction
//! submission. Implementations: [`rpc::JsonRpcProvider`] for a node or
//! wallet speaking EIP-1193 style JSON-RPC, [`local::LocalKeyProvider`] for
//! locally held keys, and [`memory::InMemoryLedger`] for tests and demos.

pub mod local;
pub mod memory;
pub mod rpc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

/// EIP-1193 "user rejected request" error code.
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code nodes use for reverted executions.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// A read-only contract call (`eth_call`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    /// Caller to simulate; contracts that scope answers to `msg.sender`
    /// need it set.
    pub from: Option<Address>,
    pub to: Address,
    pub data: Vec<u8>,
}

/// A state-changing transaction to be signed and submitted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

/// Failures reported by a wallet provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("rejected by user: {0}")]
    Rejected(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classifies a JSON-RPC error object.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();

        if code == USER_REJECTED_CODE
            || lower.contains("user rejected")
            || lower.contains("user denied")
        {
            ProviderError::Rejected(message)
        } else if code == EXECUTION_REVERTED_CODE || lower.contains("execution reverted") {
            ProviderError::Reverted(message)
        } else {
            ProviderError::Rpc { code, message }
        }
    }
}

/// An EIP-1193 style wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Executes a view call without creating a transaction.
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, ProviderError>;

    /// Asks the wallet for account access. A declined prompt is
    /// [`ProviderError::Rejected`].
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Signs and submits a transaction, returning its hash once the provider
    /// has accepted it. Does not wait for inclusion.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip1193_rejection_code() {
        assert_eq!(
            ProviderError::from_rpc(4001, "User rejected the request."),
            ProviderError::Rejected("User rejected the request.".into())
        );
    }

    #[test]
    fn rejection_by_message() {
        assert!(matches!(
            ProviderError::from_rpc(-32603, "MetaMask Tx Signature: User denied transaction signature."),
            ProviderError::Rejected(_)
        ));
    }

    #[test]
    fn revert_by_code_and_message() {
        assert!(matches!(
            ProviderError::from_rpc(3, "execution reverted: not whitelisted"),
            ProviderError::Reverted(_)
        ));
        assert!(matches!(
            ProviderError::from_rpc(
                -32603,
                "Error: VM Exception while processing transaction: execution reverted"
            ),
            ProviderError::Reverted(_)
        ));
    }

    #[test]
    fn other_codes_stay_rpc_errors() {
        assert_eq!(
            ProviderError::from_rpc(-32601, "method not found"),
            ProviderError::Rpc {
                code: -32601,
                message: "method not found".into()
            }
        );
    }
}
