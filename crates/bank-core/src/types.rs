use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chain_eth::units;
use serde::{Deserialize, Serialize};

use crate::error::{BankError, Result};

/// Known ERC-20 contract interfaces the client can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenInterface {
    Matic,
    Shib,
    Usdt,
}

impl TokenInterface {
    /// Decimal places of the token's smallest unit.
    pub fn decimals(&self) -> u8 {
        match self {
            TokenInterface::Matic | TokenInterface::Shib => 18,
            TokenInterface::Usdt => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenInterface::Matic => "Matic",
            TokenInterface::Shib => "Shib",
            TokenInterface::Usdt => "Usdt",
        }
    }
}

/// How the client interacts with an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetInterface {
    /// The chain's native currency, held by the ledger itself.
    Native { decimals: u8 },
    Token(TokenInterface),
}

impl AssetInterface {
    pub fn decimals(&self) -> u8 {
        match self {
            AssetInterface::Native { decimals } => *decimals,
            AssetInterface::Token(token) => token.decimals(),
        }
    }
}

/// A resolved whitelisted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    /// Token contract address; the ledger address for the native asset.
    pub address: Address,
    pub interface: AssetInterface,
}

impl Asset {
    pub fn is_native(&self) -> bool {
        matches!(self.interface, AssetInterface::Native { .. })
    }

    pub fn decimals(&self) -> u8 {
        self.interface.decimals()
    }
}

/// Which way value moves relative to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Wallet to ledger.
    Deposit,
    /// Ledger to wallet.
    Withdraw,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Deposit => write!(f, "deposit"),
            Direction::Withdraw => write!(f, "withdraw"),
        }
    }
}

impl FromStr for Direction {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(Direction::Deposit),
            "withdraw" => Ok(Direction::Withdraw),
            other => Err(BankError::Encoding(format!("unknown direction {other:?}"))),
        }
    }
}

/// A ledger balance in the asset's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub symbol: String,
    pub amount: U256,
    pub decimals: u8,
}

impl Balance {
    /// Exact decimal rendering, e.g. `"1.5"`.
    pub fn display(&self) -> Result<String> {
        Ok(units::to_display_unit(self.amount, self.decimals)?)
    }

    /// Rendering rounded half-up to `places` fractional digits. Presentation
    /// only; never feed it back into a transfer.
    pub fn rounded(&self, places: u8) -> Result<String> {
        Ok(units::round_display(self.amount, self.decimals, places)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_decimals() {
        assert_eq!(TokenInterface::Matic.decimals(), 18);
        assert_eq!(TokenInterface::Shib.decimals(), 18);
        assert_eq!(TokenInterface::Usdt.decimals(), 6);
    }

    #[test]
    fn native_asset_reports_its_decimals() {
        let asset = Asset {
            symbol: "Eth".into(),
            address: Address::ZERO,
            interface: AssetInterface::Native { decimals: 18 },
        };
        assert!(asset.is_native());
        assert_eq!(asset.decimals(), 18);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("Deposit".parse::<Direction>().unwrap(), Direction::Deposit);
        assert_eq!(" withdraw ".parse::<Direction>().unwrap(), Direction::Withdraw);
        assert!("swap".parse::<Direction>().is_err());
    }

    #[test]
    fn balance_rendering() {
        let balance = Balance {
            symbol: "Eth".into(),
            amount: U256::from(1_500_000_000_000_000_000u64),
            decimals: 18,
        };
        assert_eq!(balance.display().unwrap(), "1.5");
        assert_eq!(balance.rounded(2).unwrap(), "1.50");
    }

    #[test]
    fn rounding_is_half_up() {
        let balance = Balance {
            symbol: "Usdt".into(),
            amount: U256::from(1_005_000u64),
            decimals: 6,
        };
        assert_eq!(balance.rounded(2).unwrap(), "1.01");

        let below = Balance {
            amount: U256::from(1_004_999u64),
            ..balance
        };
        assert_eq!(below.rounded(2).unwrap(), "1.00");
    }
}
