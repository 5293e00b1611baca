//! Transaction building: fee estimation, payload construction, and the
//! sign-exactly-once rule.
//!
//! All chain-specific knowledge sits behind the three collaborator traits.
//! The engine orchestrates: resolve parameters, optionally simulate gas on
//! one endpoint, sign once, and hand the immutable envelope to the
//! broadcast engine.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::{
    config::TransactionConfig,
    engine::errors::EngineError,
    rpc::Endpoint,
    types::{
        Address, FeeParameters, SignedTransactionEnvelope, TxParams, TxPriority,
        UnsignedTransaction,
    },
};

/// Produces fee parameters for a priority tier.
///
/// The engine ships no estimation logic; strategies differ per chain and
/// per operator.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
    async fn estimate(
        &self,
        priority: TxPriority,
        chain_id: u64,
        endpoints: &[Arc<Endpoint>],
    ) -> Result<FeeParameters, EngineError>;
}

/// Builds an unsigned transaction payload from a function call and resolved
/// parameters. Owns ABI encoding.
pub trait TransactionCodec: Send + Sync {
    fn build(
        &self,
        function: &str,
        args: &[serde_json::Value],
        params: &TxParams,
    ) -> Result<UnsignedTransaction, EngineError>;
}

/// Signs a transaction. Owns key material.
pub trait TransactionSigner: Send + Sync {
    /// The sender address the engine resolves nonces for.
    fn address(&self) -> Address;

    fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransactionEnvelope, EngineError>;
}

/// Builds and signs a transaction exactly once.
///
/// When gas estimation is enabled, `eth_estimateGas` is simulated against
/// exactly the given endpoint (the first endpoint of the chosen broadcast
/// group); its result replaces the configured gas limit and the payload is
/// rebuilt before signing. A simulation failure is surfaced to the caller,
/// never retried on another endpoint.
///
/// # Errors
///
/// Codec, signer, or gas simulation failures.
pub async fn build_and_sign(
    codec: &dyn TransactionCodec,
    signer: &dyn TransactionSigner,
    config: &TransactionConfig,
    function: &str,
    args: &[serde_json::Value],
    nonce: u64,
    chain_id: u64,
    fees: FeeParameters,
    simulate_on: Option<&Arc<Endpoint>>,
    timeout: Duration,
) -> Result<SignedTransactionEnvelope, EngineError> {
    let mut params =
        TxParams { from: signer.address(), nonce, gas_limit: config.gas_limit, chain_id, fees };
    let mut unsigned = codec.build(function, args, &params)?;

    if config.enable_gas_estimation {
        if let Some(endpoint) = simulate_on {
            let estimated =
                endpoint.rpc().estimate_gas(unsigned.payload.clone(), timeout).await?;
            info!(
                endpoint = %endpoint.name(),
                estimated,
                configured = config.gas_limit,
                "gas estimation simulated"
            );
            params.gas_limit = estimated;
            unsigned = codec.build(function, args, &params)?;
        }
    }

    let envelope = signer.sign(&unsigned)?;
    info!(hash = %envelope.hash, nonce, "transaction signed");
    Ok(envelope)
}
