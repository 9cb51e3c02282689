//! Window store (C5)
//!
//! Holds the mutable counters/sums keyed by `(customer, day_key)` and
//! `(customer, week_key)`, plus a global per-day gate map for
//! scenario-specific rules. Missing keys read as zero; commits are
//! additive; there is no eviction, so any key referenced by a later event
//! in the stream always retains its accumulated value.
//!
//! # Critical invariants
//!
//! - attempts and amounts are monotonically non-decreasing
//! - `daily_accepted_amount`/`weekly_accepted_amount` equal the sum of
//!   `effective_amount` over accepted first-occurrence events for that key
//! - `daily_attempts` equals the count of first-occurrence events for that
//!   key (never replays or conflicts)
//!
//! Only the commit controller (C7) is allowed to call `commit`; everyone
//! else gets `snapshot`, an immutable view.

use crate::money::Money;
use crate::time_keys::{DayKey, WeekKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CustomerDayKey {
    customer_id: String,
    day_key: DayKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CustomerWeekKey {
    customer_id: String,
    week_key: WeekKey,
}

#[derive(Debug, Clone, Default)]
struct DailyCounters {
    attempts: u64,
    accepted_amount: Money,
}

/// Mutable per-scenario window state: daily attempts, daily/weekly accepted
/// amounts, and named global per-day gate counters.
#[derive(Debug, Clone, Default)]
pub struct WindowState {
    daily: BTreeMap<CustomerDayKey, DailyCounters>,
    weekly: BTreeMap<CustomerWeekKey, Money>,
    global_day_gates: BTreeMap<(DayKey, String), u64>,
}

/// An immutable, point-in-time view of the counters relevant to one event,
/// captured before policy evaluation and embedded in its `Decision` for
/// audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub daily_attempts: u64,
    pub daily_accepted_amount: Money,
    pub weekly_accepted_amount: Money,
}

/// The set of state mutations the commit controller (C7) applies for one
/// event. All fields are non-negative deltas; the store itself never
/// decides which to apply non-zero, that is the commit controller's job.
#[derive(Debug, Clone, Default)]
pub struct CommitDeltas {
    pub attempts: u64,
    pub accepted_amount: Money,
    pub weekly_accepted_amount: Money,
    pub global_gate_increments: Vec<String>,
}

impl WindowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the counters for `(customer_id, day_key, week_key)` atomically.
    /// Missing keys read as zero.
    pub fn snapshot(&self, customer_id: &str, day_key: DayKey, week_key: WeekKey) -> Snapshot {
        let daily = self
            .daily
            .get(&CustomerDayKey {
                customer_id: customer_id.to_string(),
                day_key,
            })
            .cloned()
            .unwrap_or_default();
        let weekly = self
            .weekly
            .get(&CustomerWeekKey {
                customer_id: customer_id.to_string(),
                week_key,
            })
            .copied()
            .unwrap_or(Money::ZERO);

        Snapshot {
            daily_attempts: daily.attempts,
            daily_accepted_amount: daily.accepted_amount,
            weekly_accepted_amount: weekly,
        }
    }

    /// Read a named global per-day gate counter. Missing keys read as zero.
    pub fn global_gate_count(&self, day_key: DayKey, gate_name: &str) -> u64 {
        self.global_day_gates
            .get(&(day_key, gate_name.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Apply a commit. Additive only; never called for replays or conflicts.
    pub fn commit(
        &mut self,
        customer_id: &str,
        day_key: DayKey,
        week_key: WeekKey,
        deltas: &CommitDeltas,
    ) {
        let day_entry = self
            .daily
            .entry(CustomerDayKey {
                customer_id: customer_id.to_string(),
                day_key,
            })
            .or_default();
        day_entry.attempts += deltas.attempts;
        day_entry.accepted_amount = day_entry.accepted_amount + deltas.accepted_amount;

        if deltas.weekly_accepted_amount != Money::ZERO {
            let week_entry = self
                .weekly
                .entry(CustomerWeekKey {
                    customer_id: customer_id.to_string(),
                    week_key,
                })
                .or_insert(Money::ZERO);
            *week_entry = *week_entry + deltas.weekly_accepted_amount;
        }

        for gate_name in &deltas.global_gate_increments {
            *self
                .global_day_gates
                .entry((day_key, gate_name.clone()))
                .or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn keys(day: u32) -> (DayKey, WeekKey) {
        let t = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        let tk = crate::time_keys::derive(t);
        (tk.day_key, tk.week_key)
    }

    #[test]
    fn missing_keys_read_as_zero() {
        let state = WindowState::new();
        let (day, week) = keys(1);
        let snap = state.snapshot("cust", day, week);
        assert_eq!(snap.daily_attempts, 0);
        assert_eq!(snap.daily_accepted_amount, Money::ZERO);
        assert_eq!(snap.weekly_accepted_amount, Money::ZERO);
    }

    #[test]
    fn commit_is_additive_across_multiple_calls() {
        let mut state = WindowState::new();
        let (day, week) = keys(1);
        let deltas = CommitDeltas {
            attempts: 1,
            accepted_amount: Money::from_minor_units(1000),
            weekly_accepted_amount: Money::from_minor_units(1000),
            global_gate_increments: vec![],
        };
        state.commit("cust", day, week, &deltas);
        state.commit("cust", day, week, &deltas);

        let snap = state.snapshot("cust", day, week);
        assert_eq!(snap.daily_attempts, 2);
        assert_eq!(snap.daily_accepted_amount, Money::from_minor_units(2000));
        assert_eq!(snap.weekly_accepted_amount, Money::from_minor_units(2000));
    }

    #[test]
    fn distinct_customers_do_not_share_counters() {
        let mut state = WindowState::new();
        let (day, week) = keys(1);
        let deltas = CommitDeltas {
            attempts: 1,
            accepted_amount: Money::from_minor_units(500),
            weekly_accepted_amount: Money::from_minor_units(500),
            global_gate_increments: vec![],
        };
        state.commit("cust-a", day, week, &deltas);
        let snap_b = state.snapshot("cust-b", day, week);
        assert_eq!(snap_b.daily_attempts, 0);
    }

    #[test]
    fn global_gate_counters_increment_by_name() {
        let mut state = WindowState::new();
        let (day, _week) = keys(1);
        state.commit(
            "cust",
            day,
            keys(1).1,
            &CommitDeltas {
                attempts: 0,
                accepted_amount: Money::ZERO,
                weekly_accepted_amount: Money::ZERO,
                global_gate_increments: vec!["prime_daily".to_string()],
            },
        );
        assert_eq!(state.global_gate_count(day, "prime_daily"), 1);
        assert_eq!(state.global_gate_count(day, "other_gate"), 0);
    }
}
