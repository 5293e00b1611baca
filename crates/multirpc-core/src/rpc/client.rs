//! The per-endpoint RPC surface.
//!
//! `RpcApi` is the seam between the engine and the network: production code
//! uses [`HttpRpcClient`], tests substitute a scripted mock. Every method
//! takes an explicit timeout so the caller owns escalation policy.

use async_trait::async_trait;
use serde_json::json;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::Duration,
};

use crate::{
    rpc::{errors::RpcError, http_client::HttpClient},
    types::{
        parse_hex_u64, Address, Block, BlockId, Hash32, JsonRpcRequest, JsonRpcResponse,
        TxReceipt,
    },
};

/// JSON-RPC methods the engine needs from a single endpoint.
#[async_trait]
pub trait RpcApi: Send + Sync {
    /// Raw JSON-RPC request. The typed methods below are built on this.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcError>;

    /// `eth_chainId`.
    async fn chain_id(&self, timeout: Duration) -> Result<u64, RpcError> {
        let result = self.request("eth_chainId", json!([]), timeout).await?;
        parse_quantity(&result)
    }

    /// `eth_getTransactionCount` (the account nonce).
    async fn transaction_count(
        &self,
        address: Address,
        block: BlockId,
        timeout: Duration,
    ) -> Result<u64, RpcError> {
        let params = json!([address.to_string(), block.as_param()]);
        let result = self.request("eth_getTransactionCount", params, timeout).await?;
        parse_quantity(&result)
    }

    /// `eth_call` against an opaque call object.
    async fn call(
        &self,
        call: serde_json::Value,
        block: BlockId,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcError> {
        self.request("eth_call", json!([call, block.as_param()]), timeout).await
    }

    /// `eth_estimateGas` against an opaque transaction object.
    async fn estimate_gas(
        &self,
        tx: serde_json::Value,
        timeout: Duration,
    ) -> Result<u64, RpcError> {
        let result = self.request("eth_estimateGas", json!([tx]), timeout).await?;
        parse_quantity(&result)
    }

    /// `eth_sendRawTransaction` of a pre-signed payload.
    async fn send_raw_transaction(
        &self,
        raw: &bytes::Bytes,
        timeout: Duration,
    ) -> Result<Hash32, RpcError> {
        let payload = format!("0x{}", hex::encode(raw));
        let result = self.request("eth_sendRawTransaction", json!([payload]), timeout).await?;
        let text = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("transaction hash is not a string".into()))?;
        Ok(Hash32::try_from(text)?)
    }

    /// `eth_getTransactionReceipt`; `None` when the transaction is not yet mined.
    async fn transaction_receipt(
        &self,
        hash: Hash32,
        timeout: Duration,
    ) -> Result<Option<TxReceipt>, RpcError> {
        let result =
            self.request("eth_getTransactionReceipt", json!([hash.to_string()]), timeout).await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(TxReceipt::from_value(result)?))
    }

    /// `eth_getBlockByNumber` / `eth_getBlockByHash`; `None` when unknown.
    async fn block_by_id(
        &self,
        block: BlockId,
        full_transactions: bool,
        timeout: Duration,
    ) -> Result<Option<Block>, RpcError> {
        let method = if block.is_hash() { "eth_getBlockByHash" } else { "eth_getBlockByNumber" };
        let result =
            self.request(method, json!([block.as_param(), full_transactions]), timeout).await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(Block::from_value(result)?))
    }
}

fn parse_quantity(result: &serde_json::Value) -> Result<u64, RpcError> {
    let text = result
        .as_str()
        .ok_or_else(|| RpcError::InvalidResponse("quantity is not a string".into()))?;
    Ok(parse_hex_u64(text)?)
}

/// `RpcApi` over HTTP, sharing one pooled [`HttpClient`] across endpoints.
pub struct HttpRpcClient {
    url: String,
    http: Arc<HttpClient>,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    #[must_use]
    pub fn new(url: impl Into<String>, http: Arc<HttpClient>) -> Self {
        Self { url: url.into(), http, next_id: AtomicU64::new(1) }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcApi for HttpRpcClient {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, Some(params), json!(id));

        let body = serde_json::to_vec(&request)
            .map_err(|e| RpcError::InvalidRequest(format!("failed to serialize request: {e}")))?;

        let response_bytes =
            self.http.send_request(&self.url, bytes::Bytes::from(body), timeout).await?;

        let response: JsonRpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| RpcError::InvalidResponse(format!("invalid json: {e}")))?;

        if let Some(error) = response.error {
            return Err(RpcError::Rpc(error.code, error.message));
        }

        // eth_getTransactionReceipt and friends answer a literal null result
        response.result.ok_or_else(|| RpcError::InvalidResponse("missing result".into()))
    }
}
