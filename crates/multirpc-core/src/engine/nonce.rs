//! Nonce resolution: ask every view endpoint for the account's transaction
//! count and take the maximum.
//!
//! This is a gather, not a race: all answers are awaited (no cancellation),
//! because a lagging endpoint may be the only one that has seen the latest
//! transaction. Per-endpoint failures are swallowed and logged.

use futures_util::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    engine::errors::EngineError,
    pool::Pool,
    types::{Address, BlockId},
};

/// Resolves the next nonce for `address` as the maximum transaction count
/// reported by any view endpoint.
///
/// # Errors
///
/// [`EngineError::AllEndpointsFailed`] carrying the last error when no
/// endpoint produced an answer.
pub async fn resolve_nonce(
    pool: &Pool,
    address: Address,
    timeout: Duration,
) -> Result<u64, EngineError> {
    let lookups = pool.all_endpoints().map(|endpoint| async move {
        let result = endpoint.rpc().transaction_count(address, BlockId::Latest, timeout).await;
        (endpoint, result)
    });

    let mut best: Option<u64> = None;
    let mut last_error: Option<EngineError> = None;

    for (endpoint, result) in join_all(lookups).await {
        match result {
            Ok(count) => {
                endpoint.update_health(true, None).await;
                best = Some(best.map_or(count, |b| b.max(count)));
            }
            Err(error) => {
                warn!(endpoint = %endpoint.name(), error = %error, "nonce lookup failed");
                endpoint.update_health(false, None).await;
                last_error = Some(error.into());
            }
        }
    }

    match best {
        Some(nonce) => {
            debug!(address = %address, nonce, "nonce resolved");
            Ok(nonce)
        }
        None => Err(EngineError::all_failed(last_error)),
    }
}
