use serde::{Deserialize, Serialize};

/// Definition of an EVM-compatible blockchain network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: String,
    /// Ticker of the native currency.
    pub symbol: String,
    pub decimals: u8,
    pub rpc_url: String,
    pub is_testnet: bool,
}

/// Local Hardhat development node (chain ID 31337).
pub fn hardhat() -> EvmChain {
    EvmChain {
        chain_id: 31337,
        name: "Hardhat".into(),
        symbol: "ETH".into(),
        decimals: 18,
        rpc_url: "http://127.0.0.1:8545".into(),
        is_testnet: true,
    }
}
