//! The racing primitive: run one operation against every endpoint of a
//! group concurrently, return the first success, cancel the rest.
//!
//! Cancellation is drop-based: once a branch wins (or a fatal error aborts
//! the race) the remaining futures are dropped, which cancels any in-flight
//! request synchronously.

use futures_util::future::select_all;
use std::{future::Future, sync::Arc};
use tracing::{debug, warn};

use crate::{
    engine::{
        classify::ErrorClass,
        errors::EngineError,
    },
    observer::{EngineEvent, EngineObserver},
    rpc::Endpoint,
};

/// The success half of a race outcome: which endpoint won, and with what.
#[derive(Debug)]
pub struct RaceWinner<T> {
    pub endpoint: Arc<Endpoint>,
    pub value: T,
}

/// Races `branches` and returns the first success.
///
/// Each branch failure is classified: `Fatal` aborts the race with that
/// error, `Ignorable` drops the branch silently (an event is still emitted),
/// `Transient` drops the branch and is remembered as the last cause. When
/// every branch is consumed without a winner the race fails with
/// [`EngineError::AllEndpointsFailed`] carrying the last transient error.
///
/// An empty branch list yields the aggregate error immediately. Completion
/// order is whatever the runtime delivers; callers must not rely on it.
///
/// # Errors
///
/// The fatal branch error, or the aggregate error described above.
pub async fn race<T, F, C>(
    operation: &'static str,
    branches: Vec<(Arc<Endpoint>, F)>,
    classify: C,
    observer: &dyn EngineObserver,
) -> Result<RaceWinner<T>, EngineError>
where
    F: Future<Output = Result<T, EngineError>>,
    C: Fn(&EngineError) -> ErrorClass,
{
    let mut futures: Vec<_> = branches
        .into_iter()
        .map(|(endpoint, fut)| Box::pin(async move { (endpoint, fut.await) }))
        .collect();

    let mut last_transient: Option<EngineError> = None;

    while !futures.is_empty() {
        let ((endpoint, outcome), _index, remaining) = select_all(futures).await;
        futures = remaining;

        match outcome {
            Ok(value) => {
                debug!(operation, endpoint = %endpoint.name(), "race won");
                observer.on_event(EngineEvent::RaceWon {
                    operation,
                    endpoint: endpoint.name().to_string(),
                });
                endpoint.update_health(true, None).await;
                return Ok(RaceWinner { endpoint, value });
            }
            Err(error) => match classify(&error) {
                ErrorClass::Fatal => {
                    warn!(
                        operation,
                        endpoint = %endpoint.name(),
                        error = %error,
                        "fatal error, aborting race"
                    );
                    return Err(error);
                }
                ErrorClass::Ignorable => {
                    debug!(
                        operation,
                        endpoint = %endpoint.name(),
                        error = %error,
                        "ignorable rejection, dropping branch"
                    );
                    observer.on_event(EngineEvent::BranchIgnored {
                        operation,
                        endpoint: endpoint.name().to_string(),
                        reason: error.to_string(),
                    });
                }
                ErrorClass::Transient => {
                    warn!(
                        operation,
                        endpoint = %endpoint.name(),
                        error = %error,
                        "branch failed"
                    );
                    endpoint.update_health(false, None).await;
                    last_transient = Some(error);
                }
            },
        }
    }

    Err(EngineError::all_failed(last_transient))
}
