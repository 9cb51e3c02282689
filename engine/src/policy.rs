//! Policy evaluator (C6)
//!
//! Applies the strict, deterministic ordered rule set against an event's
//! features and window snapshot: daily attempt count, scenario-specific
//! global gates, daily accepted amount, weekly accepted amount. Produces a
//! `Verdict`, a sum type rather than an exception path, so callers never
//! have to distinguish "policy declined" from "policy failed".
//!
//! Rule evaluation order is part of the contract, not an implementation
//! detail: gates run before amount checks because a gate can preempt an
//! entire class of events regardless of amount.

use crate::decision::ReasonCode;
use crate::features::Features;
use crate::money::Money;
use crate::time_keys::DayKey;
use crate::window::Snapshot;

/// A scenario-specific global gate: a named rule evaluated against a
/// per-tag amount cap and/or a global per-day accept counter cap.
#[derive(Clone)]
pub struct GateRule {
    pub name: String,
    /// Selects which events this gate applies to (e.g. "tagged prime").
    pub predicate: fn(&Features) -> bool,
    /// Decline if `effective_amount` exceeds this cap.
    pub amount_cap: Option<Money>,
    /// Decline if accepting this event would take the named global
    /// per-day accept counter above this cap.
    pub daily_global_cap: Option<u64>,
}

impl std::fmt::Debug for GateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateRule")
            .field("name", &self.name)
            .field("amount_cap", &self.amount_cap)
            .field("daily_global_cap", &self.daily_global_cap)
            .finish()
    }
}

/// Accept/decline outcome of policy evaluation, plus bookkeeping the
/// commit controller (C7) needs.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub accepted: bool,
    pub reasons: Vec<ReasonCode>,
    /// Gates whose predicate matched this event, whether or not they
    /// violated; the commit controller increments these on accept only.
    pub matched_gates: Vec<String>,
}

/// Ordered rule set and limits injected at scenario build (C10).
#[derive(Debug, Clone)]
pub struct PolicyLimits {
    pub daily_attempt_limit: u64,
    pub daily_amount_limit: Money,
    pub weekly_amount_limit: Money,
    pub gates: Vec<GateRule>,
    /// `false` (default): short-circuit on first violation.
    /// `true`: accumulate every violated reason into one verdict.
    pub multi_reason: bool,
}

/// Evaluate the ordered rule set for one event.
pub fn evaluate(
    limits: &PolicyLimits,
    day_key: DayKey,
    snapshot: Snapshot,
    features: &Features,
    global_gate_count: impl Fn(DayKey, &str) -> u64,
) -> Verdict {
    let mut reasons = Vec::new();
    let mut declined = false;
    let matched_gates: Vec<String> = limits
        .gates
        .iter()
        .filter(|g| (g.predicate)(features))
        .map(|g| g.name.clone())
        .collect();

    macro_rules! violate {
        ($reason:expr) => {{
            reasons.push($reason);
            declined = true;
            if !limits.multi_reason {
                return finish(reasons, declined, matched_gates);
            }
        }};
    }

    // 1. Daily attempt count.
    if snapshot.daily_attempts + 1 > limits.daily_attempt_limit {
        violate!(ReasonCode::DailyAttemptLimit);
    }

    // 2. Scenario-specific global gates, evaluated before amount checks.
    for gate in &limits.gates {
        if !(gate.predicate)(features) {
            continue;
        }
        if let Some(cap) = gate.amount_cap {
            if features.effective_amount > cap {
                violate!(ReasonCode::Gate(gate.name.clone()));
            }
        }
        if let Some(cap) = gate.daily_global_cap {
            if global_gate_count(day_key, &gate.name) + 1 > cap {
                violate!(ReasonCode::Gate(gate.name.clone()));
            }
        }
    }

    // 3. Daily accepted amount. Zero-amount events never violate: adding
    // zero can't exceed a non-negative limit.
    if snapshot
        .daily_accepted_amount
        .checked_add(features.effective_amount)
        .map(|total| total > limits.daily_amount_limit)
        .unwrap_or(true)
    {
        violate!(ReasonCode::DailyAmountLimit);
    }

    // 4. Weekly accepted amount.
    if snapshot
        .weekly_accepted_amount
        .checked_add(features.effective_amount)
        .map(|total| total > limits.weekly_amount_limit)
        .unwrap_or(true)
    {
        violate!(ReasonCode::WeeklyAmountLimit);
    }

    finish(reasons, declined, matched_gates)
}

fn finish(reasons: Vec<ReasonCode>, declined: bool, matched_gates: Vec<String>) -> Verdict {
    Verdict {
        accepted: !declined,
        reasons,
        matched_gates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Tags;
    use chrono::{TimeZone, Utc};

    fn day() -> DayKey {
        crate::time_keys::derive(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).day_key
    }

    fn baseline_limits() -> PolicyLimits {
        PolicyLimits {
            daily_attempt_limit: 3,
            daily_amount_limit: Money::from_minor_units(500000),
            weekly_amount_limit: Money::from_minor_units(2000000),
            gates: vec![],
            multi_reason: false,
        }
    }

    fn features(amount_minor: i64) -> Features {
        Features {
            effective_amount: Money::from_minor_units(amount_minor),
            tags: Tags::default(),
        }
    }

    fn zero_snapshot() -> Snapshot {
        Snapshot {
            daily_attempts: 0,
            daily_accepted_amount: Money::ZERO,
            weekly_accepted_amount: Money::ZERO,
        }
    }

    fn no_gates(_day: DayKey, _name: &str) -> u64 {
        0
    }

    #[test]
    fn exactly_at_attempt_limit_is_accepted() {
        let limits = baseline_limits();
        let snap = Snapshot {
            daily_attempts: 2,
            ..zero_snapshot()
        };
        let verdict = evaluate(&limits, day(), snap, &features(100), no_gates);
        assert!(verdict.accepted);
    }

    #[test]
    fn one_past_attempt_limit_is_declined() {
        let limits = baseline_limits();
        let snap = Snapshot {
            daily_attempts: 3,
            ..zero_snapshot()
        };
        let verdict = evaluate(&limits, day(), snap, &features(100), no_gates);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reasons, vec![ReasonCode::DailyAttemptLimit]);
    }

    #[test]
    fn exact_amount_match_is_accepted() {
        let limits = baseline_limits();
        let verdict = evaluate(&limits, day(), zero_snapshot(), &features(500000), no_gates);
        assert!(verdict.accepted);
    }

    #[test]
    fn one_cent_past_amount_limit_is_declined() {
        let limits = baseline_limits();
        let verdict = evaluate(&limits, day(), zero_snapshot(), &features(500001), no_gates);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reasons, vec![ReasonCode::DailyAmountLimit]);
    }

    #[test]
    fn zero_amount_never_violates_amount_limits() {
        let limits = PolicyLimits {
            daily_amount_limit: Money::ZERO,
            weekly_amount_limit: Money::ZERO,
            ..baseline_limits()
        };
        let verdict = evaluate(&limits, day(), zero_snapshot(), &features(0), no_gates);
        assert!(verdict.accepted);
    }

    #[test]
    fn short_circuit_reports_only_first_violation() {
        let limits = PolicyLimits {
            daily_amount_limit: Money::ZERO,
            weekly_amount_limit: Money::ZERO,
            ..baseline_limits()
        };
        let snap = Snapshot {
            daily_attempts: 3,
            ..zero_snapshot()
        };
        let verdict = evaluate(&limits, day(), snap, &features(100), no_gates);
        assert_eq!(verdict.reasons, vec![ReasonCode::DailyAttemptLimit]);
    }

    #[test]
    fn multi_reason_mode_accumulates_every_violation() {
        let limits = PolicyLimits {
            daily_amount_limit: Money::ZERO,
            weekly_amount_limit: Money::ZERO,
            multi_reason: true,
            ..baseline_limits()
        };
        let snap = Snapshot {
            daily_attempts: 3,
            ..zero_snapshot()
        };
        let verdict = evaluate(&limits, day(), snap, &features(100), no_gates);
        assert_eq!(
            verdict.reasons,
            vec![
                ReasonCode::DailyAttemptLimit,
                ReasonCode::DailyAmountLimit,
                ReasonCode::WeeklyAmountLimit
            ]
        );
    }

    #[test]
    fn gate_amount_cap_declines_when_exceeded() {
        let gate = GateRule {
            name: "PRIME_AMOUNT_CAP".to_string(),
            predicate: |f| f.tags.is_prime_id,
            amount_cap: Some(Money::from_minor_units(1000)),
            daily_global_cap: None,
        };
        let limits = PolicyLimits {
            gates: vec![gate],
            ..baseline_limits()
        };
        let prime_features = Features {
            effective_amount: Money::from_minor_units(2000),
            tags: Tags { is_prime_id: true },
        };
        let verdict = evaluate(&limits, day(), zero_snapshot(), &prime_features, no_gates);
        assert!(!verdict.accepted);
        assert_eq!(
            verdict.reasons,
            vec![ReasonCode::Gate("PRIME_AMOUNT_CAP".to_string())]
        );
    }

    #[test]
    fn non_matching_gate_is_ignored() {
        let gate = GateRule {
            name: "PRIME_AMOUNT_CAP".to_string(),
            predicate: |f| f.tags.is_prime_id,
            amount_cap: Some(Money::from_minor_units(1000)),
            daily_global_cap: None,
        };
        let limits = PolicyLimits {
            gates: vec![gate],
            ..baseline_limits()
        };
        let non_prime = Features {
            effective_amount: Money::from_minor_units(2000),
            tags: Tags { is_prime_id: false },
        };
        let verdict = evaluate(&limits, day(), zero_snapshot(), &non_prime, no_gates);
        assert!(verdict.accepted);
        assert!(verdict.matched_gates.is_empty());
    }

    #[test]
    fn global_daily_cap_declines_once_exhausted() {
        let gate = GateRule {
            name: "PRIME_DAILY_GLOBAL_LIMIT".to_string(),
            predicate: |f| f.tags.is_prime_id,
            amount_cap: None,
            daily_global_cap: Some(1),
        };
        let limits = PolicyLimits {
            gates: vec![gate],
            ..baseline_limits()
        };
        let prime_features = Features {
            effective_amount: Money::from_minor_units(100),
            tags: Tags { is_prime_id: true },
        };
        let verdict = evaluate(&limits, day(), zero_snapshot(), &prime_features, |_, _| 1);
        assert!(!verdict.accepted);
        assert_eq!(
            verdict.reasons,
            vec![ReasonCode::Gate("PRIME_DAILY_GLOBAL_LIMIT".to_string())]
        );
    }
}
