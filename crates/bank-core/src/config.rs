use std::collections::BTreeMap;

use alloy_primitives::{address, Address};
use chain_eth::chains::{self, EvmChain};
use serde::{Deserialize, Serialize};

use crate::types::{AssetInterface, TokenInterface};

/// Ledger contract address on a freshly deployed local Hardhat node.
pub const DEFAULT_LEDGER_ADDRESS: Address = address!("5FC8d32690cc91D4c39d9d3abcBD16989F875707");

/// Ledger symbol of the native currency.
pub const DEFAULT_NATIVE_SYMBOL: &str = "Eth";

/// Fractional digits shown in balance views.
pub const DEFAULT_DISPLAY_PLACES: u8 = 2;

/// Static deployment facts for a bank client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub ledger_address: Address,
    /// Symbol the ledger uses for native currency. Never resolved remotely.
    pub native_symbol: String,
    pub chain: EvmChain,
    /// Ledger symbol to ERC-20 interface.
    pub tokens: BTreeMap<String, TokenInterface>,
    pub display_places: u8,
}

impl Default for BankConfig {
    fn default() -> Self {
        let tokens = [TokenInterface::Matic, TokenInterface::Shib, TokenInterface::Usdt]
            .into_iter()
            .map(|token| (token.name().to_string(), token))
            .collect();

        Self {
            ledger_address: DEFAULT_LEDGER_ADDRESS,
            native_symbol: DEFAULT_NATIVE_SYMBOL.to_string(),
            chain: chains::hardhat(),
            tokens,
            display_places: DEFAULT_DISPLAY_PLACES,
        }
    }
}

impl BankConfig {
    /// Interface for a ledger symbol, or `None` when the client has no
    /// mapping for it.
    pub fn interface_for(&self, symbol: &str) -> Option<AssetInterface> {
        if self.is_native(symbol) {
            return Some(AssetInterface::Native {
                decimals: self.chain.decimals,
            });
        }
        self.tokens.get(symbol).copied().map(AssetInterface::Token)
    }

    pub fn is_native(&self, symbol: &str) -> bool {
        symbol == self.native_symbol
    }

    /// Loads a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
