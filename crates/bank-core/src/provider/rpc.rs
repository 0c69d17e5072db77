use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::{CallRequest, ProviderError, TransactionRequest, WalletProvider};

const JSONRPC_VERSION: &str = "2.0";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Transaction object shared by `eth_call`, `eth_estimateGas` and
/// `eth_sendTransaction`.
#[derive(Debug, Serialize)]
pub(crate) struct TransactionObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

impl From<&CallRequest> for TransactionObject {
    fn from(request: &CallRequest) -> Self {
        Self {
            from: request.from,
            to: request.to,
            value: None,
            data: Bytes::from(request.data.clone()),
        }
    }
}

impl From<&TransactionRequest> for TransactionObject {
    fn from(tx: &TransactionRequest) -> Self {
        Self {
            from: Some(tx.from),
            to: tx.to,
            value: Some(tx.value),
            data: Bytes::from(tx.data.clone()),
        }
    }
}

/// A wallet provider reached over HTTP JSON-RPC, e.g. a local Hardhat node
/// with unlocked accounts or a wallet bridge.
#[derive(Debug)]
pub struct JsonRpcProvider {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(endpoint: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let url = Url::parse(endpoint)
            .map_err(|e| ProviderError::Unavailable(format!("invalid endpoint {endpoint}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.url
    }

    /// Issues a JSON-RPC call and deserialises the result into `R`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, ProviderError> {
        let payload = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        trace!(method, id = payload.id, "rpc request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "{method}: http status {}",
                response.status()
            )));
        }

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        if let Some(error) = response.error {
            debug!(method, code = error.code, message = %error.message, "rpc error");
            return Err(ProviderError::from_rpc(error.code, describe(&error)));
        }

        let result = response
            .result
            .ok_or_else(|| ProviderError::InvalidResponse(format!("{method}: empty result")))?;
        serde_json::from_value(result)
            .map_err(|e| ProviderError::InvalidResponse(format!("{method}: {e}")))
    }
}

/// Appends revert data to the message when the node supplies it.
fn describe(error: &JsonRpcError) -> String {
    match &error.data {
        Some(Value::String(data)) => format!("{} ({data})", error.message),
        _ => error.message.clone(),
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, ProviderError> {
        let object = TransactionObject::from(&request);
        let raw: Bytes = self.request("eth_call", json!([object, "latest"])).await?;
        Ok(raw.to_vec())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, ProviderError> {
        let object = TransactionObject::from(&tx);
        self.request("eth_sendTransaction", json!([object])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn rejects_malformed_endpoint() {
        assert!(matches!(
            JsonRpcProvider::new("not a url"),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn call_object_omits_missing_fields() {
        let request = CallRequest {
            from: None,
            to: address!("5FC8d32690cc91D4c39d9d3abcBD16989F875707"),
            data: vec![0xab, 0xcd],
        };
        let value = serde_json::to_value(TransactionObject::from(&request)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object["to"]
            .as_str()
            .unwrap()
            .eq_ignore_ascii_case("0x5FC8d32690cc91D4c39d9d3abcBD16989F875707"));
        assert_eq!(object["data"], json!("0xabcd"));
    }

    #[test]
    fn transaction_object_carries_value() {
        let tx = TransactionRequest {
            from: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            to: address!("5FC8d32690cc91D4c39d9d3abcBD16989F875707"),
            value: U256::from(1_000u64),
            data: Vec::new(),
        };
        let value = serde_json::to_value(TransactionObject::from(&tx)).unwrap();
        assert_eq!(value["value"], json!("0x3e8"));
        assert_eq!(value["data"], json!("0x"));
        assert!(value.get("from").is_some());
    }

    #[test]
    fn revert_data_is_appended() {
        let error = JsonRpcError {
            code: 3,
            message: "execution reverted".into(),
            data: Some(json!("0x08c379a0")),
        };
        assert_eq!(describe(&error), "execution reverted (0x08c379a0)");
    }

    #[tokio::test]
    async fn unreachable_node_is_unavailable() {
        let provider =
            JsonRpcProvider::with_timeout("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            provider.request_accounts().await,
            Err(ProviderError::Unavailable(_))
        ));
    }
}
