use std::collections::BTreeMap;

use chain_eth::ledger;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::BankConfig;
use crate::error::{BankError, Result};
use crate::registry::AssetTable;
use crate::session::Connection;
use crate::types::{Asset, Balance};

/// Ledger balances for every resolved asset, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    balances: Vec<Balance>,
}

impl BalanceSheet {
    pub fn get(&self, symbol: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.symbol == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Symbol to amount rounded half-up to `places` digits.
    pub fn display_map(&self, places: u8) -> Result<BTreeMap<String, String>> {
        self.balances
            .iter()
            .map(|b| Ok((b.symbol.clone(), b.rounded(places)?)))
            .collect()
    }
}

/// Reads the selected account's ledger balance for one asset.
pub async fn get_balance(
    asset: &Asset,
    connection: &Connection,
    config: &BankConfig,
) -> Result<Balance> {
    let data = ledger::encode_get_token_balance(&asset.symbol)?;
    let raw = connection
        .read_as_account(config.ledger_address, data)
        .await?;
    let amount = ledger::decode_token_balance(&raw)?;
    debug!(symbol = %asset.symbol, %amount, "balance read");

    Ok(Balance {
        symbol: asset.symbol.clone(),
        amount,
        decimals: asset.decimals(),
    })
}

/// Reads every asset's balance concurrently. Fails with the first failing
/// symbol; no partial sheet is returned.
pub async fn get_all_balances(
    assets: &AssetTable,
    connection: &Connection,
    config: &BankConfig,
) -> Result<BalanceSheet> {
    connection.require_account()?;

    let balances = try_join_all(assets.iter().map(|asset| async move {
        get_balance(asset, connection, config)
            .await
            .map_err(|source| {
                warn!(symbol = %asset.symbol, error = %source, "balance query failed");
                BankError::BalanceQuery {
                    symbol: asset.symbol.clone(),
                    source: Box::new(source),
                }
            })
    }))
    .await?;

    Ok(BalanceSheet { balances })
}
