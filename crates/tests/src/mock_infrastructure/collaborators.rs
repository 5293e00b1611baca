//! Collaborator implementations wired over the real RPC surface, plus a
//! config helper for assembling pools from mock server URLs.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::{sync::Arc, time::Duration};

use multirpc_core::{
    config::EngineConfig,
    engine::{
        BatchedViewResult, EngineError, FeeEstimator, Multicall, TransactionCodec,
        TransactionSigner, ViewCall,
    },
    rpc::{Endpoint, RpcApi, RpcError},
    types::{
        parse_hex_u64, Address, BlockId, FeeParameters, Hash32, SignedTransactionEnvelope,
        TxParams, TxPriority, UnsignedTransaction,
    },
};

/// Builds an [`EngineConfig`] from per-group URL lists.
#[must_use]
pub fn engine_config(view: &[(&str, &[&str])], transaction: &[(&str, &[&str])]) -> EngineConfig {
    let mut config = EngineConfig::default();
    for (key, urls) in view {
        config.pools.view.insert(key.to_string(), urls.iter().map(|u| u.to_string()).collect());
    }
    for (key, urls) in transaction {
        config
            .pools
            .transaction
            .insert(key.to_string(), urls.iter().map(|u| u.to_string()).collect());
    }
    config
}

/// Issues one `eth_call` per view call plus one `eth_blockNumber`, standing
/// in for an on-chain batching contract.
pub struct SimpleMulticall;

#[async_trait]
impl Multicall for SimpleMulticall {
    async fn call(
        &self,
        endpoint: &Arc<Endpoint>,
        calls: &[ViewCall],
        block: BlockId,
        timeout: Duration,
    ) -> Result<Vec<BatchedViewResult>, EngineError> {
        let mut values = Vec::with_capacity(calls.len());
        for view_call in calls {
            let object = json!({ "data": view_call.function, "args": view_call.args });
            values.push(endpoint.rpc().call(object, block, timeout).await?);
        }

        let head = endpoint.rpc().request("eth_blockNumber", json!([]), timeout).await?;
        let text = head.as_str().ok_or_else(|| {
            RpcError::InvalidResponse("block number is not a string".into())
        })?;
        let block_number = parse_hex_u64(text).map_err(RpcError::from)?;

        Ok(vec![BatchedViewResult { block_number, values }])
    }
}

/// Fee estimator answering a fixed legacy gas price without touching the network.
pub struct FlatFeeEstimator {
    pub gas_price: u128,
}

#[async_trait]
impl FeeEstimator for FlatFeeEstimator {
    async fn estimate(
        &self,
        _priority: TxPriority,
        _chain_id: u64,
        _endpoints: &[Arc<Endpoint>],
    ) -> Result<FeeParameters, EngineError> {
        Ok(FeeParameters::Legacy { gas_price: self.gas_price })
    }
}

/// Codec that packs the call into a JSON payload instead of ABI bytes.
pub struct JsonCodec;

impl TransactionCodec for JsonCodec {
    fn build(
        &self,
        function: &str,
        args: &[serde_json::Value],
        params: &TxParams,
    ) -> Result<UnsignedTransaction, EngineError> {
        Ok(UnsignedTransaction {
            params: *params,
            payload: json!({ "function": function, "args": args }),
        })
    }
}

/// Signer answering fixed raw bytes and a fixed hash.
pub struct StaticSigner {
    pub address: Address,
    pub raw: Bytes,
    pub hash: Hash32,
}

impl StaticSigner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: Address([0xaa; 20]),
            raw: Bytes::from_static(b"\xf8\x6b\x01\x02"),
            hash: Hash32([0xaa; 32]),
        }
    }
}

impl Default for StaticSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSigner for StaticSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, _tx: &UnsignedTransaction) -> Result<SignedTransactionEnvelope, EngineError> {
        Ok(SignedTransactionEnvelope { raw: self.raw.clone(), hash: self.hash })
    }
}
