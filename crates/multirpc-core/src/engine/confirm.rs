//! Confirmation polling: watch the winning endpoint until the transaction
//! is mined, with a bounded retry budget.
//!
//! Two failure modes get retries, nothing else does:
//! - connection errors: up to [`MAX_CONNECTION_RETRIES`] retries with a
//!   fixed sleep, then the error propagates;
//! - receipt not found inside the poll window: exactly one retry with the
//!   window doubled, then [`EngineError::ConfirmationTimedOut`].
//!
//! A receipt with failing status is fatal immediately and never retried.

use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    engine::errors::EngineError,
    observer::{EngineEvent, EngineObserver},
    rpc::Endpoint,
    types::{ConfirmationState, Hash32, TxReceipt},
};

/// Connection-error retry budget.
pub const MAX_CONNECTION_RETRIES: u32 = 5;

/// Fixed sleep between connection-error retries.
pub const CONNECTION_RETRY_SLEEP: Duration = Duration::from_secs(5);

/// Pause between successful-but-empty polls inside a window.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls `endpoint` for the receipt of `hash`.
///
/// Only the endpoint that won the broadcast is polled; other endpoints may
/// not have seen the transaction at all.
///
/// # Errors
///
/// [`EngineError::TransactionFailed`] for a mined-but-failed transaction,
/// [`EngineError::ConfirmationTimedOut`] after the doubled window also
/// elapses, or the last connection error once the retry budget is spent.
pub async fn wait_for_receipt(
    endpoint: &Arc<Endpoint>,
    hash: Hash32,
    window: Duration,
    poll_timeout: Duration,
    observer: &dyn EngineObserver,
) -> Result<TxReceipt, EngineError> {
    observer.on_event(EngineEvent::Confirmation { hash, state: ConfirmationState::Waiting });

    let mut window = window;
    let mut connection_errors: u32 = 0;
    let mut window_doubled = false;

    loop {
        let deadline = Instant::now() + window;

        while Instant::now() < deadline {
            match endpoint.rpc().transaction_receipt(hash, poll_timeout).await {
                Ok(Some(receipt)) => {
                    if receipt.status {
                        info!(
                            endpoint = %endpoint.name(),
                            hash = %hash,
                            block = receipt.block_number,
                            "transaction confirmed"
                        );
                        observer.on_event(EngineEvent::Confirmation {
                            hash,
                            state: ConfirmationState::Confirmed,
                        });
                        return Ok(receipt);
                    }
                    warn!(endpoint = %endpoint.name(), hash = %hash, "transaction failed on chain");
                    observer.on_event(EngineEvent::Confirmation {
                        hash,
                        state: ConfirmationState::Failed,
                    });
                    return Err(EngineError::TransactionFailed(hash));
                }
                Ok(None) => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(error) if error.is_connection() => {
                    connection_errors += 1;
                    if connection_errors > MAX_CONNECTION_RETRIES {
                        warn!(
                            endpoint = %endpoint.name(),
                            hash = %hash,
                            retries = MAX_CONNECTION_RETRIES,
                            "giving up after repeated connection errors"
                        );
                        observer.on_event(EngineEvent::Confirmation {
                            hash,
                            state: ConfirmationState::GivenUp,
                        });
                        return Err(error.into());
                    }
                    observer.on_event(EngineEvent::RetryScheduled {
                        reason: "connection error",
                        attempt: connection_errors,
                        delay: CONNECTION_RETRY_SLEEP,
                    });
                    tokio::time::sleep(CONNECTION_RETRY_SLEEP).await;
                }
                Err(error) => {
                    observer.on_event(EngineEvent::Confirmation {
                        hash,
                        state: ConfirmationState::GivenUp,
                    });
                    return Err(error.into());
                }
            }
        }

        if window_doubled {
            observer.on_event(EngineEvent::Confirmation {
                hash,
                state: ConfirmationState::GivenUp,
            });
            return Err(EngineError::ConfirmationTimedOut(hash));
        }

        window_doubled = true;
        window *= 2;
        warn!(
            endpoint = %endpoint.name(),
            hash = %hash,
            window_secs = window.as_secs(),
            "receipt not found in time, retrying once with doubled window"
        );
        observer.on_event(EngineEvent::RetryScheduled {
            reason: "receipt not found",
            attempt: 1,
            delay: window,
        });
    }
}
