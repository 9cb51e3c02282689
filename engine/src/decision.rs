//! Decision shape (§3, §6.2) and reason-code taxonomy (§7)
//!
//! A `Decision` is produced exactly once per input `seq` and is the only
//! thing handed to the emitter (C9). Everything upstream of the driver
//! works with intermediate types; this is the terminal shape.

use crate::money::Money;
use crate::window::Snapshot;
use serde::{Deserialize, Serialize};

/// Accept/decline outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Accepted,
    Declined,
}

/// Reason-code taxonomy (§7). `LimitGate` covers scenario-specific global
/// gate violations, which carry their own name since the set of gates is
/// open (configured per scenario, not fixed at compile time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    MalformedInput,
    DuplicateIdReplay,
    DuplicateIdConflict,
    DailyAttemptLimit,
    DailyAmountLimit,
    WeeklyAmountLimit,
    /// A named scenario-specific global gate violation, e.g.
    /// `PRIME_AMOUNT_CAP` or `PRIME_DAILY_GLOBAL_LIMIT`.
    Gate(String),
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonCode::MalformedInput => write!(f, "MALFORMED_INPUT"),
            ReasonCode::DuplicateIdReplay => write!(f, "DUPLICATE_ID_REPLAY"),
            ReasonCode::DuplicateIdConflict => write!(f, "DUPLICATE_ID_CONFLICT"),
            ReasonCode::DailyAttemptLimit => write!(f, "DAILY_ATTEMPT_LIMIT"),
            ReasonCode::DailyAmountLimit => write!(f, "DAILY_AMOUNT_LIMIT"),
            ReasonCode::WeeklyAmountLimit => write!(f, "WEEKLY_AMOUNT_LIMIT"),
            ReasonCode::Gate(name) => write!(f, "{}", name),
        }
    }
}

/// One decision per input position, in `seq` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub seq: u64,
    pub load_id: String,
    pub customer_id: String,
    pub status: Status,
    pub reasons: Vec<ReasonCode>,
    pub snapshot_before: Option<Snapshot>,
    pub snapshot_after: Option<Snapshot>,
    /// `seq` of the first-occurrence event for this `load_id`; equals
    /// `seq` itself for first occurrences.
    pub canonical_seq: u64,
    /// Amount actually evaluated against policy (post risk multiplier).
    /// `None` for malformed-input and conflict decisions, which never
    /// reach feature derivation.
    pub effective_amount: Option<Money>,
}

impl Decision {
    pub fn accepted(&self) -> bool {
        matches!(self.status, Status::Accepted)
    }
}
