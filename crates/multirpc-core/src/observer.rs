//! Injectable observability seam.
//!
//! The engine logs through `tracing` at every interesting call site, and in
//! parallel hands typed events to an [`EngineObserver`]. Tests assert on the
//! events instead of capturing log output; embedders can forward them to
//! their own telemetry.

use std::{sync::Arc, time::Duration};

use crate::types::{ConfirmationState, Hash32};

/// Typed engine events, emitted alongside the corresponding log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// An endpoint failed its connectivity probe and was dropped at setup.
    EndpointDropped { endpoint: String, error: String },
    /// The chain id was resolved across all usable endpoints.
    ChainIdResolved { chain_id: u64 },
    /// A race finished with a winner.
    RaceWon { operation: &'static str, endpoint: String },
    /// A race branch failed with an ignorable error and was skipped.
    BranchIgnored { operation: &'static str, endpoint: String, reason: String },
    /// The confirmation poller scheduled another attempt.
    RetryScheduled { reason: &'static str, attempt: u32, delay: Duration },
    /// The confirmation poller changed state.
    Confirmation { hash: Hash32, state: ConfirmationState },
}

/// Receiver for [`EngineEvent`]s.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

/// Discards every event; the default observer.
#[derive(Debug, Default)]
pub struct NullObserver;

impl EngineObserver for NullObserver {
    fn on_event(&self, _event: EngineEvent) {}
}

/// Buffers events for test assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: parking_lot::Mutex<Vec<EngineEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }
}

impl EngineObserver for RecordingObserver {
    fn on_event(&self, event: EngineEvent) {
        self.events.lock().push(event);
    }
}
