//! Generic multi-pool reads with the last-error convention: when every
//! group is exhausted, the caller sees the last countable error (the most
//! recent not-found or connectivity failure), not a generic aggregate.

use futures_util::future::BoxFuture;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::debug;

use crate::{
    engine::{classify::classify_query, errors::EngineError, race::race},
    observer::EngineObserver,
    pool::Pool,
    rpc::Endpoint,
    types::{Block, BlockId, Hash32, TxReceipt},
};

/// Races `op` across each group of `pool` in order.
///
/// Not-found and connectivity failures are countable: the race treats them
/// as transient and the most recent one is remembered. Any other failure is
/// fatal and aborts the query. On full exhaustion the last countable error
/// is raised.
///
/// # Errors
///
/// The fatal branch error, the last countable error on exhaustion, or
/// [`EngineError::NoEndpointAvailable`] when nothing was even attempted.
pub async fn query_pool<T, F, Op>(
    operation: &'static str,
    pool: &Pool,
    op: Op,
    observer: &dyn EngineObserver,
) -> Result<T, EngineError>
where
    Op: Fn(Arc<Endpoint>) -> F,
    F: Future<Output = Result<T, EngineError>> + Send,
{
    let mut last_countable: Option<EngineError> = None;

    for group in pool.groups() {
        let branches: Vec<(Arc<Endpoint>, F)> = group
            .endpoints
            .iter()
            .map(|endpoint| (Arc::clone(endpoint), op(Arc::clone(endpoint))))
            .collect();

        match race(operation, branches, classify_query, observer).await {
            Ok(winner) => return Ok(winner.value),
            Err(EngineError::AllEndpointsFailed { last }) => {
                debug!(operation, group = %group.key, "query group exhausted, falling back");
                if let Some(last) = last {
                    last_countable = Some(*last);
                }
            }
            Err(fatal) => return Err(fatal),
        }
    }

    Err(last_countable.unwrap_or(EngineError::NoEndpointAvailable))
}

/// Looks up a transaction receipt across the view pool.
///
/// # Errors
///
/// [`EngineError::NotFound`] when no endpoint knows the transaction yet.
pub async fn get_tx_receipt(
    pool: &Pool,
    hash: Hash32,
    timeout: Duration,
    observer: &dyn EngineObserver,
) -> Result<TxReceipt, EngineError> {
    query_pool(
        "get_tx_receipt",
        pool,
        move |endpoint| {
            let fut: BoxFuture<'static, Result<TxReceipt, EngineError>> =
                Box::pin(async move {
                    endpoint
                        .rpc()
                        .transaction_receipt(hash, timeout)
                        .await?
                        .ok_or(EngineError::NotFound("transaction receipt"))
                });
            fut
        },
        observer,
    )
    .await
}

/// Looks up a block across the view pool.
///
/// # Errors
///
/// [`EngineError::NotFound`] when no endpoint knows the block.
pub async fn get_block(
    pool: &Pool,
    block: BlockId,
    full_transactions: bool,
    timeout: Duration,
    observer: &dyn EngineObserver,
) -> Result<Block, EngineError> {
    query_pool(
        "get_block",
        pool,
        move |endpoint| {
            let fut: BoxFuture<'static, Result<Block, EngineError>> = Box::pin(async move {
                endpoint
                    .rpc()
                    .block_by_id(block, full_transactions, timeout)
                    .await?
                    .ok_or(EngineError::NotFound("block"))
            });
            fut
        },
        observer,
    )
    .await
}
