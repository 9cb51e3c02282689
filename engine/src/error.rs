//! Fatal, non-local errors (§7)
//!
//! Per-event errors (malformed input, replay, conflict, limit violations)
//! never reach this type; they become reason codes on a decline
//! decision. `EngineError` is reserved for invariant breaches: anything
//! that would mean the window store or idempotency table has become
//! internally inconsistent. These are logged at `error` level and abort
//! the run; any decisions already emitted are retained.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invariant breach: {0}")]
    Invariant(String),
}

/// Log and construct a `FATAL_INTERNAL` error for an observed invariant
/// breach, e.g. a non-monotonic counter or a scale mismatch.
pub fn invariant_breach(detail: impl std::fmt::Display) -> EngineError {
    let message = detail.to_string();
    tracing::error!(invariant = %message, "FATAL_INTERNAL: invariant breach detected");
    EngineError::Invariant(message)
}
