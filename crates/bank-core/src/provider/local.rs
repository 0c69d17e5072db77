use alloy_primitives::{Address, B256, U128, U64};
use async_trait::async_trait;
use chain_eth::address::address_from_private_key;
use chain_eth::transaction::{build_call, sign_transaction, FeeParams};
use secrecy::{ExposeSecret, SecretBox};
use serde_json::json;
use tracing::debug;
use zeroize::Zeroize;

use super::rpc::{JsonRpcProvider, TransactionObject};
use super::{CallRequest, ProviderError, TransactionRequest, WalletProvider};
use crate::error::{BankError, Result};

/// Extra gas on top of the node's estimate, in percent.
const GAS_HEADROOM_PERCENT: u64 = 20;

/// Signs EIP-1559 transactions with a locally held key and broadcasts them
/// through a JSON-RPC node. Account access is never prompted: the key's
/// address is the only account.
#[derive(Debug)]
pub struct LocalKeyProvider {
    rpc: JsonRpcProvider,
    key: SecretBox<[u8; 32]>,
    address: Address,
    chain_id: u64,
}

impl LocalKeyProvider {
    pub fn new(rpc: JsonRpcProvider, mut private_key: [u8; 32], chain_id: u64) -> Result<Self> {
        let derived = address_from_private_key(&private_key);
        let key = SecretBox::new(Box::new(private_key));
        private_key.zeroize();

        Ok(Self {
            rpc,
            key,
            address: derived?,
            chain_id,
        })
    }

    /// Parses a hex private key, with or without `0x`.
    pub fn from_hex(rpc: JsonRpcProvider, private_key: &str, chain_id: u64) -> Result<Self> {
        let trimmed = private_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(digits)
            .map_err(|_| BankError::Encoding("private key is not valid hex".into()))?;

        let key: Result<[u8; 32]> = bytes
            .as_slice()
            .try_into()
            .map_err(|_| BankError::Encoding(format!("private key is {} bytes, expected 32", bytes.len())));
        bytes.zeroize();
        Self::new(rpc, key?, chain_id)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn fees(&self, tx: &TransactionRequest) -> std::result::Result<FeeParams, ProviderError> {
        let object = TransactionObject::from(tx);
        let (gas, gas_price, priority) = futures::try_join!(
            self.rpc.request::<U64>("eth_estimateGas", json!([object])),
            self.rpc.request::<U128>("eth_gasPrice", json!([])),
            self.rpc.request::<U128>("eth_maxPriorityFeePerGas", json!([])),
        )?;
        Ok(fee_params(gas.to::<u64>(), gas_price.to::<u128>(), priority.to::<u128>()))
    }
}

/// Pads the gas estimate and caps the fee at twice the current gas price,
/// never below the priority tip.
fn fee_params(gas_estimate: u64, gas_price: u128, priority_fee: u128) -> FeeParams {
    let headroom = gas_estimate.saturating_mul(GAS_HEADROOM_PERCENT) / 100;
    FeeParams {
        max_priority_fee_per_gas: priority_fee,
        max_fee_per_gas: gas_price.saturating_mul(2).max(priority_fee),
        gas_limit: gas_estimate.saturating_add(headroom),
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    async fn call(&self, request: CallRequest) -> std::result::Result<Vec<u8>, ProviderError> {
        self.rpc.call(request).await
    }

    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
        Ok(vec![self.address])
    }

    async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> std::result::Result<B256, ProviderError> {
        if tx.from != self.address {
            return Err(ProviderError::Rejected(format!(
                "no key for account {}",
                tx.from
            )));
        }

        let nonce: U64 = self
            .rpc
            .request("eth_getTransactionCount", json!([self.address, "pending"]))
            .await?;
        let fees = self.fees(&tx).await?;

        let unsigned = build_call(
            self.chain_id,
            nonce.to::<u64>(),
            tx.to,
            tx.value,
            tx.data,
            fees,
        )
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let signed = sign_transaction(&unsigned, self.key.expose_secret())
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        debug!(
            nonce = unsigned.nonce,
            gas_limit = fees.gas_limit,
            hash = %signed.tx_hash,
            "broadcasting signed transaction"
        );
        let raw = format!("0x{}", hex::encode(&signed.raw_tx));
        self.rpc
            .request("eth_sendRawTransaction", json!([raw]))
            .await
    }
}
