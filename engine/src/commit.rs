//! Commit controller (C7)
//!
//! Translates a `Verdict` into the `CommitDeltas` the window store (C5)
//! applies. This is the only place in the engine that decides *which*
//! counters move for a first-occurrence event; replays and conflicts never
//! reach this module.
//!
//! # Commit rules
//!
//! - `daily_attempts` increments unconditionally for every first-occurrence
//!   event, accepted or declined.
//! - Accepted: daily/weekly accepted amount increment by `effective_amount`,
//!   and every gate whose predicate matched increments its global counter.
//! - Declined: only the attempt counter moves.

use crate::features::Features;
use crate::policy::Verdict;
use crate::window::CommitDeltas;

/// Build the commit deltas for a first-occurrence event given its verdict.
pub fn deltas_for(verdict: &Verdict, features: &Features) -> CommitDeltas {
    if verdict.accepted {
        CommitDeltas {
            attempts: 1,
            accepted_amount: features.effective_amount,
            weekly_accepted_amount: features.effective_amount,
            global_gate_increments: verdict.matched_gates.clone(),
        }
    } else {
        CommitDeltas {
            attempts: 1,
            ..Default::default()
        }
    }
}
