//! Idempotency gate (C3)
//!
//! Classifies each event against the `load_id -> IdempotencyRecord` table:
//! first occurrence, replay (same fingerprint), or conflict (different
//! fingerprint). In streaming mode the first occurrence is always treated
//! as real, since the future is unknown; state integrity instead comes
//! from "commit only on first occurrence, never on replay or conflict".
//!
//! The gate never creates a record itself for a first occurrence; it
//! only classifies. The driver (C8) installs the record once the
//! canonical decision is known.

use crate::decision::Decision;
use crate::fingerprint::Fingerprint;
use std::collections::HashMap;

/// A canonical, immutable record of the first occurrence of a `load_id`.
#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub canonical_fingerprint: Fingerprint,
    pub canonical_decision: Decision,
}

/// Outcome of classifying one event's `load_id` against the gate.
#[derive(Debug, Clone)]
pub enum Classification<'a> {
    /// No record exists yet for this `load_id`.
    FirstOccurrence,
    /// A record exists and its fingerprint matches.
    Replay(&'a IdempotencyRecord),
    /// A record exists and its fingerprint differs.
    Conflict(&'a IdempotencyRecord),
}

/// The `load_id -> IdempotencyRecord` table, owned exclusively by the
/// driver for the duration of a scenario run.
#[derive(Debug, Default)]
pub struct IdempotencyGate {
    records: HashMap<String, IdempotencyRecord>,
}

impl IdempotencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `load_id` given the incoming event's fingerprint.
    pub fn classify(&self, load_id: &str, incoming_fingerprint: Fingerprint) -> Classification<'_> {
        match self.records.get(load_id) {
            None => Classification::FirstOccurrence,
            Some(record) if record.canonical_fingerprint == incoming_fingerprint => {
                Classification::Replay(record)
            }
            Some(record) => Classification::Conflict(record),
        }
    }

    /// Install the canonical record for a first-occurrence `load_id`.
    /// Never called for replays or conflicts; a `load_id` transitions out
    /// of `[absent]` exactly once.
    pub fn install(&mut self, load_id: String, fingerprint: Fingerprint, decision: Decision) {
        self.records.insert(
            load_id,
            IdempotencyRecord {
                canonical_fingerprint: fingerprint,
                canonical_decision: decision,
            },
        );
    }
}
