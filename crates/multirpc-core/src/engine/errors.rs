use thiserror::Error;

use crate::{rpc::RpcError, types::Hash32};

/// Engine-level failures.
///
/// Everything a race branch can fail with is an `EngineError`; the
/// classifiers in `engine::classify` decide how each one steers the race.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// A pool or group has no usable endpoint.
    #[error("no endpoint available")]
    NoEndpointAvailable,

    /// Every raced endpoint failed; carries the last transient cause.
    #[error("all endpoints failed{}", last_cause(.last))]
    AllEndpointsFailed { last: Option<Box<EngineError>> },

    /// An endpoint rejected the transaction for a reason that is not in the
    /// ignorable table. Aborts the broadcast immediately.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    /// The transaction was mined with a failing status. Never retried.
    #[error("transaction {0} failed on chain")]
    TransactionFailed(Hash32),

    /// The confirmation poller gave up after its single doubled-window retry.
    #[error("transaction {0} not confirmed in time")]
    ConfirmationTimedOut(Hash32),

    /// A read found nothing (receipt not mined yet, unknown block).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An operation needs a collaborator that was not provided.
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// Endpoint-level transport or JSON-RPC failure.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

fn last_cause(last: &Option<Box<EngineError>>) -> String {
    match last {
        Some(e) => format!(", last error: {e}"),
        None => String::new(),
    }
}

impl EngineError {
    /// Wraps the last transient failure of an exhausted race.
    #[must_use]
    pub fn all_failed(last: Option<EngineError>) -> Self {
        Self::AllEndpointsFailed { last: last.map(Box::new) }
    }

    /// Returns `true` when the underlying cause is a connectivity failure.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Rpc(e) if e.is_connection())
    }

    /// The endpoint's rejection message, when this wraps a JSON-RPC rejection.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rpc(e) => e.rejection_message(),
            _ => None,
        }
    }
}
