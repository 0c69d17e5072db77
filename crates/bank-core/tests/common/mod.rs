use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use bank_core::provider::memory::InMemoryLedger;
use bank_core::{Bank, BankConfig, WalletProvider};

pub const USER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const MATIC: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
pub const SHIB: Address = address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");
pub const USDT: Address = address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");

pub const ONE_AND_A_HALF_ETH: u64 = 1_500_000_000_000_000_000;
pub const TWO_USDT: u64 = 2_000_000;

/// A ledger shaped like the local deployment: native currency plus the
/// three mapped tokens, with some funds already deposited.
pub fn deployed_ledger() -> Arc<InMemoryLedger> {
    let config = BankConfig::default();
    Arc::new(
        InMemoryLedger::new(config.ledger_address)
            .with_account(USER)
            .with_native("Eth")
            .with_token("Matic", MATIC)
            .with_token("Shib", SHIB)
            .with_token("Usdt", USDT)
            .with_balance(USER, "Eth", U256::from(ONE_AND_A_HALF_ETH))
            .with_balance(USER, "Usdt", U256::from(TWO_USDT)),
    )
}

pub async fn start(provider: &Arc<InMemoryLedger>) -> Bank {
    let provider: Arc<dyn WalletProvider> = provider.clone();
    Bank::start(Some(provider), BankConfig::default())
        .await
        .unwrap()
}

pub async fn connected(provider: &Arc<InMemoryLedger>) -> Bank {
    let mut bank = start(provider).await;
    bank.connect().await.unwrap();
    bank
}
