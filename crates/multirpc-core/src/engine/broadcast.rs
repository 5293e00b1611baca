//! Racing broadcast: fan the identical signed payload out to every endpoint
//! of a transaction group, first acceptance wins.

use futures_util::future::BoxFuture;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

use crate::{
    engine::{
        classify::{classify_broadcast, ErrorClass},
        errors::EngineError,
        race::{race, RaceWinner},
    },
    observer::EngineObserver,
    pool::Pool,
    rpc::Endpoint,
    types::{Hash32, SignedTransactionEnvelope},
};

/// Broadcasts the envelope across the transaction pool.
///
/// Groups are consulted in order; within a group every endpoint receives the
/// same raw bytes concurrently and the first acceptance wins. Rejections in
/// the ignorable table (a sibling already carried the transaction forward)
/// drop that branch silently; any other rejection aborts everything as
/// [`EngineError::TransactionRejected`]. Returns the winning endpoint so the
/// confirmation poller can stick to it.
///
/// # Errors
///
/// `TransactionRejected` on a fatal rejection, or the aggregate failure when
/// every group is exhausted.
pub async fn broadcast(
    pool: &Pool,
    envelope: &SignedTransactionEnvelope,
    timeout: Duration,
    observer: &dyn EngineObserver,
) -> Result<RaceWinner<Hash32>, EngineError> {
    let mut last_failure = EngineError::all_failed(None);

    for group in pool.groups() {
        let branches: Vec<(Arc<Endpoint>, BoxFuture<'_, _>)> = group
            .endpoints
            .iter()
            .map(|endpoint| {
                let endpoint = Arc::clone(endpoint);
                let branch_endpoint = Arc::clone(&endpoint);
                let raw = &envelope.raw;
                let fut: BoxFuture<'_, Result<Hash32, EngineError>> = Box::pin(async move {
                    Ok(branch_endpoint.rpc().send_raw_transaction(raw, timeout).await?)
                });
                (endpoint, fut)
            })
            .collect();

        match race("broadcast", branches, classify_broadcast, observer).await {
            Ok(winner) => {
                info!(
                    endpoint = %winner.endpoint.name(),
                    hash = %winner.value,
                    "transaction accepted"
                );
                return Ok(winner);
            }
            Err(error) => {
                if classify_broadcast(&error) == ErrorClass::Fatal {
                    if let Some(message) = error.rejection_message() {
                        return Err(EngineError::TransactionRejected(message.to_string()));
                    }
                }
                debug!(
                    group = %group.key,
                    error = %error,
                    "broadcast group exhausted, falling back"
                );
                last_failure = error;
            }
        }
    }

    Err(last_failure)
}
