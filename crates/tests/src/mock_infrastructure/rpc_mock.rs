//! Mock EVM JSON-RPC server built on mockito.
//!
//! Wraps mockito to provide per-method response builders for the RPC
//! surface the engine exercises.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// One mock endpoint. Each helper registers a response for a single
/// JSON-RPC method; unmatched requests get mockito's default 501.
pub struct EvmRpcMock {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl EvmRpcMock {
    /// Creates a mock with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn method_matcher(method: &str) -> Matcher {
        Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
    }

    /// Mocks `method` with a successful `result`.
    pub fn result(&mut self, method: &str, result: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Self::method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": result
                })
                .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks `method` with a JSON-RPC error response.
    pub fn rpc_error(&mut self, method: &str, code: i32, message: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Self::method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {
                        "code": code,
                        "message": message
                    }
                })
                .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks `method` with a plain HTTP error status.
    pub fn http_error(&mut self, method: &str, status: u16) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Self::method_matcher(method))
            .with_status(status.into())
            .with_body("upstream error")
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks `method` with a literal `null` result (not found).
    pub fn null_result(&mut self, method: &str) -> &mut Self {
        self.result(method, &Value::Null)
    }

    /// Mocks `eth_chainId`.
    pub fn chain_id(&mut self, chain_id: u64) -> &mut Self {
        self.result("eth_chainId", &json!(format!("0x{chain_id:x}")))
    }

    /// Mocks `eth_blockNumber`.
    pub fn block_number(&mut self, block_number: u64) -> &mut Self {
        self.result("eth_blockNumber", &json!(format!("0x{block_number:x}")))
    }

    /// Mocks `eth_getTransactionCount`.
    pub fn transaction_count(&mut self, nonce: u64) -> &mut Self {
        self.result("eth_getTransactionCount", &json!(format!("0x{nonce:x}")))
    }

    /// Mocks `eth_call` answering `value` for every call object.
    pub fn eth_call(&mut self, value: &Value) -> &mut Self {
        self.result("eth_call", value)
    }

    /// Mocks `eth_sendRawTransaction` accepting any payload with `hash`.
    pub fn accept_raw_transaction(&mut self, hash: &str) -> &mut Self {
        self.result("eth_sendRawTransaction", &json!(hash))
    }

    /// Mocks `eth_getTransactionReceipt` with a mined receipt.
    pub fn receipt(&mut self, hash: &str, block_number: u64, status: bool) -> &mut Self {
        self.result(
            "eth_getTransactionReceipt",
            &json!({
                "transactionHash": hash,
                "blockNumber": format!("0x{block_number:x}"),
                "status": if status { "0x1" } else { "0x0" }
            }),
        )
    }

    /// Mocks `eth_getBlockByNumber` with a minimal block header.
    pub fn block(&mut self, number: u64, hash: &str) -> &mut Self {
        self.result(
            "eth_getBlockByNumber",
            &json!({
                "number": format!("0x{number:x}"),
                "hash": hash,
                "transactions": []
            }),
        )
    }

    /// Verifies all registered mocks were hit at least once.
    #[must_use]
    pub fn all_called(&self) -> bool {
        self.mocks.iter().all(Mock::matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_server_has_a_url() {
        let mock = EvmRpcMock::new().await;
        assert!(mock.url().starts_with("http://"));
    }
}
