//! Error classification for the racing primitive.
//!
//! A classifier maps each branch failure to one of three classes that steer
//! the race: `Fatal` aborts everything, `Ignorable` silently drops the
//! branch, `Transient` drops the branch but is remembered as the last cause
//! for the aggregate error.

use crate::engine::errors::EngineError;

/// How a race treats one branch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Abort the whole race and surface this error.
    Fatal,
    /// Drop the branch without recording the error.
    Ignorable,
    /// Drop the branch; the last transient error backs the aggregate failure.
    Transient,
}

/// Broadcast rejections that mean some sibling endpoint already carried the
/// transaction forward (or soon will): the branch is dropped, the race goes
/// on. Single source of truth for classification and tests.
pub const IGNORABLE_BROADCAST_REJECTIONS: [&str; 6] = [
    "already known",
    "nonce too low",
    "transaction underpriced",
    "transaction would cause overdraft",
    "account suspended",
    "exceeds the configured cap",
];

/// Default classifier: every failure is transient.
///
/// Used by view calls and setup probes, where any endpoint error just means
/// "try the others".
#[must_use]
pub fn classify_default(_error: &EngineError) -> ErrorClass {
    ErrorClass::Transient
}

/// Broadcast classifier.
///
/// JSON-RPC rejections matching the ignorable table are dropped silently;
/// any other rejection is fatal (the transaction itself is bad, no endpoint
/// will accept it). Transport failures stay transient.
#[must_use]
pub fn classify_broadcast(error: &EngineError) -> ErrorClass {
    match error.rejection_message() {
        Some(message) => {
            let lower = message.to_lowercase();
            if IGNORABLE_BROADCAST_REJECTIONS.iter().any(|needle| lower.contains(needle)) {
                ErrorClass::Ignorable
            } else {
                ErrorClass::Fatal
            }
        }
        None => ErrorClass::Transient,
    }
}

/// Query classifier for receipt/block lookups.
///
/// Not-found and connectivity failures are countable (transient); anything
/// else aborts the lookup.
#[must_use]
pub fn classify_query(error: &EngineError) -> ErrorClass {
    match error {
        EngineError::NotFound(_) => ErrorClass::Transient,
        e if e.is_connection() => ErrorClass::Transient,
        _ => ErrorClass::Fatal,
    }
}
