use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tracing::{info, warn};

use crate::error::{BankError, Result};
use crate::provider::{CallRequest, ProviderError, TransactionRequest, WalletProvider};

/// A live link to the chain, in one of two modes.
///
/// Read-only connections may only issue view calls. Authenticated ones carry
/// the selected account and may submit transactions from it.
#[derive(Clone)]
pub enum Connection {
    ReadOnly {
        provider: Arc<dyn WalletProvider>,
    },
    Authenticated {
        provider: Arc<dyn WalletProvider>,
        account: Address,
    },
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::ReadOnly { .. } => f.write_str("Connection::ReadOnly"),
            Connection::Authenticated { account, .. } => {
                write!(f, "Connection::Authenticated({account})")
            }
        }
    }
}

impl Connection {
    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        match self {
            Connection::ReadOnly { provider } | Connection::Authenticated { provider, .. } => {
                provider
            }
        }
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            Connection::ReadOnly { .. } => None,
            Connection::Authenticated { account, .. } => Some(*account),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.account().is_some()
    }

    /// The selected account, or `NotAuthenticated`.
    pub fn require_account(&self) -> Result<Address> {
        self.account().ok_or(BankError::NotAuthenticated)
    }

    /// View call with no caller identity. Allowed in either mode.
    pub async fn read(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let request = CallRequest {
            from: None,
            to,
            data,
        };
        Ok(self.provider().call(request).await?)
    }

    /// View call issued from the selected account, for contract reads keyed
    /// on the caller.
    pub async fn read_as_account(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        let request = CallRequest {
            from: Some(self.require_account()?),
            to,
            data,
        };
        Ok(self.provider().call(request).await?)
    }

    /// Submits a transaction from the selected account and returns its hash
    /// once the provider acknowledges it.
    pub async fn send(&self, to: Address, value: U256, data: Vec<u8>) -> Result<B256> {
        let from = self.require_account()?;
        let tx = TransactionRequest {
            from,
            to,
            value,
            data,
        };
        let hash = self.provider().send_transaction(tx).await?;
        info!(%from, %to, tx = %hash, "transaction submitted");
        Ok(hash)
    }
}

/// Owns the connection and its upgrade from read-only to authenticated.
#[derive(Debug, Clone)]
pub struct Session {
    connection: Connection,
}

impl Session {
    /// Opens a read-only session. Does not prompt the user.
    pub fn initialize(provider: Option<Arc<dyn WalletProvider>>) -> Result<Self> {
        let provider = provider.ok_or(BankError::NoProvider)?;
        info!("session opened read-only");
        Ok(Self {
            connection: Connection::ReadOnly { provider },
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn account(&self) -> Option<Address> {
        self.connection.account()
    }

    /// Requests account access and switches to authenticated mode with the
    /// first account the wallet returns.
    ///
    /// Already-authenticated sessions return their account without
    /// prompting again. On any failure the session stays as it was.
    pub async fn upgrade(&mut self) -> Result<Address> {
        if let Some(account) = self.connection.account() {
            return Ok(account);
        }

        let provider = Arc::clone(self.connection.provider());
        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(ProviderError::Rejected(reason)) => {
                warn!(%reason, "account access declined");
                return Err(BankError::UserRejected);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(&account) = accounts.first() else {
            warn!("wallet returned no accounts");
            return Err(BankError::UserRejected);
        };

        info!(%account, "session authenticated");
        self.connection = Connection::Authenticated { provider, account };
        Ok(account)
    }
}
