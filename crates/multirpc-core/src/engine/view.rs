//! Batched view-call execution: race one batched round trip across each
//! group of the view pool, falling back to the next group when a whole
//! group fails.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::{sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    engine::{classify::classify_default, errors::EngineError, race::race},
    observer::EngineObserver,
    pool::Pool,
    rpc::Endpoint,
    types::BlockId,
};

/// One read call to batch: a function selector/name and its arguments.
///
/// Argument encoding is owned by the [`Multicall`] implementation; the
/// engine treats both as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCall {
    pub function: String,
    pub args: Vec<serde_json::Value>,
}

impl ViewCall {
    #[must_use]
    pub fn new(function: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        Self { function: function.into(), args }
    }
}

/// One page of a batched response: the decoded per-call values plus the
/// block number the endpoint answered at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchedViewResult {
    pub block_number: u64,
    pub values: Vec<serde_json::Value>,
}

/// Batches N read calls into one round trip against a single endpoint.
///
/// Implementations own ABI encoding/decoding and the aggregation protocol;
/// the engine only provides the endpoint and collects the pages.
#[async_trait]
pub trait Multicall: Send + Sync {
    async fn call(
        &self,
        endpoint: &Arc<Endpoint>,
        calls: &[ViewCall],
        block: BlockId,
        timeout: Duration,
    ) -> Result<Vec<BatchedViewResult>, EngineError>;
}

/// Executes a batch of view calls against the view pool.
///
/// Groups are consulted in order; within a group every endpoint races the
/// same batched request and the first success wins. From the winning
/// response the page with the highest observed block number is returned
/// (endpoints lag each other, the freshest page is the useful one).
///
/// # Errors
///
/// The aggregate failure of the last group when every group is exhausted.
pub async fn call_view(
    pool: &Pool,
    multicall: &Arc<dyn Multicall>,
    calls: &[ViewCall],
    block: BlockId,
    timeout: Duration,
    observer: &dyn EngineObserver,
) -> Result<BatchedViewResult, EngineError> {
    let mut last_failure = EngineError::all_failed(None);

    for group in pool.groups() {
        let branches: Vec<(Arc<Endpoint>, BoxFuture<'_, _>)> = group
            .endpoints
            .iter()
            .map(|endpoint| {
                let endpoint = Arc::clone(endpoint);
                let branch_endpoint = Arc::clone(&endpoint);
                let multicall = Arc::clone(multicall);
                let fut: BoxFuture<'_, Result<Vec<BatchedViewResult>, EngineError>> =
                    Box::pin(async move {
                        multicall.call(&branch_endpoint, calls, block, timeout).await
                    });
                (endpoint, fut)
            })
            .collect();

        match race("view", branches, classify_default, observer).await {
            Ok(winner) => {
                let page = winner
                    .value
                    .into_iter()
                    .max_by_key(|page| page.block_number)
                    .ok_or_else(|| {
                        EngineError::Rpc(crate::rpc::RpcError::InvalidResponse(
                            "batched response contained no pages".into(),
                        ))
                    })?;
                return Ok(page);
            }
            Err(error) => {
                debug!(group = %group.key, error = %error, "view group exhausted, falling back");
                last_failure = error;
            }
        }
    }

    Err(last_failure)
}
