pub mod balances;
pub mod config;
pub mod error;
pub mod provider;
pub mod registry;
pub mod session;
pub mod transfer;
pub mod types;

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

pub use balances::BalanceSheet;
pub use config::BankConfig;
pub use error::BankError;
pub use provider::WalletProvider;
pub use registry::AssetTable;
pub use session::{Connection, Session};
pub use transfer::{Transfer, TransferIntent, TransferReceipt, TransferStage};
pub use types::{Asset, AssetInterface, Balance, Direction, TokenInterface};

use error::Result;

// ─── Client facade ───────────────────────────────────────────────────
// Ties the session, the resolved asset table and the config together so
// callers do not thread them through every operation.

/// A token bank client.
#[derive(Debug)]
pub struct Bank {
    config: BankConfig,
    session: Session,
    assets: AssetTable,
}

impl Bank {
    /// Opens a read-only session and resolves the ledger's whitelist.
    pub async fn start(
        provider: Option<Arc<dyn WalletProvider>>,
        config: BankConfig,
    ) -> Result<Self> {
        let session = Session::initialize(provider)?;
        let assets = registry::load_assets(session.connection(), &config).await?;
        info!(
            ledger = %config.ledger_address,
            assets = assets.len(),
            "bank client started"
        );
        Ok(Self {
            config,
            session,
            assets,
        })
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn assets(&self) -> &AssetTable {
        &self.assets
    }

    pub fn account(&self) -> Option<Address> {
        self.session.account()
    }

    /// Prompts for account access. Idempotent once connected.
    pub async fn connect(&mut self) -> Result<Address> {
        self.session.upgrade().await
    }

    /// Ledger balances of the connected account for every known asset.
    pub async fn balances(&self) -> Result<BalanceSheet> {
        balances::get_all_balances(&self.assets, self.session.connection(), &self.config).await
    }

    /// Validates a transfer without submitting anything.
    pub fn prepare_transfer(
        &self,
        amount: &str,
        symbol: &str,
        direction: Direction,
    ) -> Result<Transfer> {
        let asset = self.assets.require(symbol)?;
        let intent = TransferIntent::parse(amount, asset, direction)?;
        Transfer::new(intent, asset, &self.config)
    }

    /// Continues a prepared or partially completed transfer.
    pub async fn resume(&self, transfer: &mut Transfer) -> Result<TransferReceipt> {
        transfer.run(self.session.connection()).await
    }

    /// Validates and runs a transfer to completion.
    pub async fn transfer(
        &self,
        amount: &str,
        symbol: &str,
        direction: Direction,
    ) -> Result<TransferReceipt> {
        let mut transfer = self.prepare_transfer(amount, symbol, direction)?;
        self.resume(&mut transfer).await
    }
}
