//! Whitelisted asset discovery and symbol resolution.

use std::collections::HashSet;

use alloy_primitives::Address;
use chain_eth::ledger;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BankConfig;
use crate::error::{BankError, Result};
use crate::session::Connection;
use crate::types::{Asset, AssetInterface};

/// Resolved assets, in whitelist order. Built once per session and never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetTable {
    assets: Vec<Asset>,
}

impl AssetTable {
    pub fn get(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    /// Like [`get`](Self::get) but reports an unknown symbol as
    /// `ResolutionFailed`.
    pub fn require(&self, symbol: &str) -> Result<&Asset> {
        self.get(symbol)
            .ok_or_else(|| BankError::ResolutionFailed(symbol.to_string()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

/// Reads the ledger's whitelist. Works on read-only connections.
pub async fn list_whitelisted_symbols(
    connection: &Connection,
    config: &BankConfig,
) -> Result<Vec<String>> {
    let raw = connection
        .read(config.ledger_address, ledger::encode_get_whitelisted_symbols())
        .await?;
    let symbols = ledger::decode_whitelisted_symbols(&raw)?;
    debug!(count = symbols.len(), "whitelist loaded");
    Ok(symbols)
}

/// Resolves one symbol to an address and interface.
///
/// Symbols without a client-side interface fail before any network call.
/// The native symbol resolves to the ledger without a lookup.
pub async fn resolve_asset(
    symbol: &str,
    connection: &Connection,
    config: &BankConfig,
) -> Result<Asset> {
    let interface = config
        .interface_for(symbol)
        .ok_or_else(|| BankError::ResolutionFailed(symbol.to_string()))?;

    let address = match interface {
        AssetInterface::Native { .. } => config.ledger_address,
        AssetInterface::Token(_) => {
            let data = ledger::encode_get_whitelisted_token_address(symbol)?;
            let raw = connection.read(config.ledger_address, data).await?;
            let address = ledger::decode_token_address(&raw)?;
            // The contract answers the zero address for symbols it never
            // whitelisted.
            if address == Address::ZERO {
                warn!(symbol, "ledger has no token address");
                return Err(BankError::ResolutionFailed(symbol.to_string()));
            }
            address
        }
    };

    debug!(symbol, %address, "asset resolved");
    Ok(Asset {
        symbol: symbol.to_string(),
        address,
        interface,
    })
}

/// Resolves every symbol concurrently. Duplicates are resolved once and the
/// table keeps first-seen order. Any failure fails the whole batch.
pub async fn resolve_all<S: AsRef<str>>(
    symbols: &[S],
    connection: &Connection,
    config: &BankConfig,
) -> Result<AssetTable> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = symbols
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| seen.insert(*s))
        .collect();

    let assets = try_join_all(
        unique
            .iter()
            .map(|symbol| resolve_asset(symbol, connection, config)),
    )
    .await?;

    info!(count = assets.len(), "asset table built");
    Ok(AssetTable { assets })
}

/// Reads the whitelist and resolves all of it.
pub async fn load_assets(connection: &Connection, config: &BankConfig) -> Result<AssetTable> {
    let symbols = list_whitelisted_symbols(connection, config).await?;
    resolve_all(symbols.as_slice(), connection, config).await
}
