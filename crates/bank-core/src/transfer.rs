//! Deposits and withdrawals against the ledger.
//!
//! A token deposit is two transactions: an ERC-20 `approve` naming the
//! ledger as spender, then `depositTokens`. The [`Transfer`] state machine
//! records which step succeeded so a failed second step can be retried
//! without approving again.

use alloy_primitives::{Address, B256, U256};
use chain_eth::{erc20, ledger, units};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BankConfig;
use crate::error::{BankError, Result};
use crate::session::Connection;
use crate::types::{Asset, Direction};

/// A validated transfer request, amount in smallest units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferIntent {
    pub amount: U256,
    pub symbol: String,
    pub direction: Direction,
}

impl TransferIntent {
    /// Parses a user-entered decimal amount with the asset's decimals.
    /// Zero, negative and over-precise amounts are rejected.
    pub fn parse(amount: &str, asset: &Asset, direction: Direction) -> Result<Self> {
        let amount_units = units::to_smallest_unit(amount, asset.decimals())?;
        if amount_units.is_zero() {
            return Err(BankError::InvalidAmount(format!(
                "{amount:?} is zero"
            )));
        }
        Ok(Self {
            amount: amount_units,
            symbol: asset.symbol.clone(),
            direction,
        })
    }
}

/// The transaction sequence a transfer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    /// Value sent straight to the ledger.
    NativeDeposit,
    /// `approve` on the token, then `depositTokens`.
    TokenDeposit,
    NativeWithdraw,
    TokenWithdraw,
}

impl Route {
    fn for_asset(asset: &Asset, direction: Direction) -> Self {
        match (asset.is_native(), direction) {
            (true, Direction::Deposit) => Route::NativeDeposit,
            (false, Direction::Deposit) => Route::TokenDeposit,
            (true, Direction::Withdraw) => Route::NativeWithdraw,
            (false, Direction::Withdraw) => Route::TokenWithdraw,
        }
    }

    pub fn needs_approval(&self) -> bool {
        matches!(self, Route::TokenDeposit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransferStage {
    Ready,
    /// Allowance granted; the ledger call is still outstanding.
    Approved { approval: B256 },
    Completed { transactions: Vec<B256> },
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub symbol: String,
    pub direction: Direction,
    pub amount: U256,
    /// Submitted transaction hashes in order; two for token deposits.
    pub transactions: Vec<B256>,
}

/// A resumable transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    intent: TransferIntent,
    asset: Asset,
    ledger: Address,
    route: Route,
    stage: TransferStage,
}

impl Transfer {
    pub fn new(intent: TransferIntent, asset: &Asset, config: &BankConfig) -> Result<Self> {
        if intent.symbol != asset.symbol {
            return Err(BankError::ResolutionFailed(intent.symbol));
        }
        if intent.amount.is_zero() {
            return Err(BankError::InvalidAmount("amount is zero".into()));
        }
        let route = Route::for_asset(asset, intent.direction);
        Ok(Self {
            intent,
            asset: asset.clone(),
            ledger: config.ledger_address,
            route,
            stage: TransferStage::Ready,
        })
    }

    pub fn intent(&self) -> &TransferIntent {
        &self.intent
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn stage(&self) -> &TransferStage {
        &self.stage
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.stage, TransferStage::Completed { .. })
    }

    /// Submits the next transaction. On failure the stage is unchanged, so
    /// calling again retries the same step.
    pub async fn advance(&mut self, connection: &Connection) -> Result<&TransferStage> {
        connection.require_account()?;
        let amount = self.intent.amount;
        let symbol = self.asset.symbol.as_str();

        let next = match (&self.stage, self.route) {
            (TransferStage::Completed { .. }, _) => return Ok(&self.stage),

            (TransferStage::Ready, Route::NativeDeposit) => {
                let hash = connection.send(self.ledger, amount, Vec::new()).await?;
                TransferStage::Completed {
                    transactions: vec![hash],
                }
            }
            (TransferStage::Ready, Route::TokenDeposit) => {
                let data = erc20::encode_approve(self.ledger, amount);
                let approval = connection.send(self.asset.address, U256::ZERO, data).await?;
                info!(symbol, %approval, "ledger approved as spender");
                TransferStage::Approved { approval }
            }
            (TransferStage::Approved { approval }, _) => {
                let approval = *approval;
                let data = ledger::encode_deposit_tokens(amount, symbol)?;
                let hash = connection
                    .send(self.ledger, U256::ZERO, data)
                    .await
                    .inspect_err(|e| {
                        warn!(symbol, %approval, error = %e, "deposit failed after approval");
                    })?;
                TransferStage::Completed {
                    transactions: vec![approval, hash],
                }
            }
            (TransferStage::Ready, Route::NativeWithdraw) => {
                let data = ledger::encode_withdraw_ether(amount);
                let hash = connection.send(self.ledger, U256::ZERO, data).await?;
                TransferStage::Completed {
                    transactions: vec![hash],
                }
            }
            (TransferStage::Ready, Route::TokenWithdraw) => {
                let data = ledger::encode_withdraw_tokens(amount, symbol)?;
                let hash = connection.send(self.ledger, U256::ZERO, data).await?;
                TransferStage::Completed {
                    transactions: vec![hash],
                }
            }
        };

        self.stage = next;
        Ok(&self.stage)
    }

    /// Advances until complete. A transfer already past approval resumes at
    /// the ledger call.
    pub async fn run(&mut self, connection: &Connection) -> Result<TransferReceipt> {
        while !self.is_complete() {
            self.advance(connection).await?;
        }
        let TransferStage::Completed { transactions } = &self.stage else {
            return Err(BankError::Encoding("transfer stopped before completion".into()));
        };

        info!(
            symbol = %self.intent.symbol,
            direction = %self.intent.direction,
            amount = %self.intent.amount,
            "transfer completed"
        );
        Ok(TransferReceipt {
            symbol: self.intent.symbol.clone(),
            direction: self.intent.direction,
            amount: self.intent.amount,
            transactions: transactions.clone(),
        })
    }
}
