//! Decision stream driver (C8)
//!
//! Drives the pipeline per input record, in input order, and binds
//! exactly one `Decision` to each `seq`. The driver exclusively owns the
//! window store and idempotency table for a scenario; every mutation
//! goes through the commit controller, every read through the snapshot
//! API (§3 "Ownership").

use crate::decision::{Decision, ReasonCode, Status};
use crate::egress::Egress;
use crate::event::{self, ParseError};
use crate::features;
use crate::fingerprint;
use crate::idempotency::{Classification, IdempotencyGate};
use crate::ingress::Ingress;
use crate::policy;
use crate::record::RawRecord;
use crate::scenario::Scenario;
use crate::time_keys;
use crate::window::WindowState;

/// Owns `WindowState` and the idempotency table for one scenario run and
/// drives records from an `Ingress` to decisions on an `Egress`.
pub struct Driver {
    scenario: Scenario,
    window: WindowState,
    idempotency: IdempotencyGate,
}

impl Driver {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            window: WindowState::new(),
            idempotency: IdempotencyGate::new(),
        }
    }

    /// Run the driver to exhaustion: read every record the ingress
    /// yields, in order, emitting exactly one decision per record.
    pub fn run(&mut self, ingress: &mut dyn Ingress, egress: &mut dyn Egress) -> std::io::Result<()> {
        while let Some(raw) = ingress.next_record() {
            let decision = self.process(raw);
            egress.emit(&decision)?;
        }
        Ok(())
    }

    /// Process exactly one raw record, mutating state as the classification
    /// and verdict dictate, and returning the decision bound to its `seq`.
    pub fn process(&mut self, raw: RawRecord) -> Decision {
        let seq = raw.seq;

        let event = match event::parse(&raw) {
            Ok(event) => event,
            Err(err) => return self.malformed_decision(seq, &err),
        };

        let keys = time_keys::derive(event.event_time);
        let fp = fingerprint::compute(&event);

        match self.idempotency.classify(&event.load_id, fp) {
            Classification::Replay(record) => {
                tracing::debug!(seq, load_id = %event.load_id, "classified as replay");
                self.replay_decision(seq, record)
            }
            Classification::Conflict(record) => {
                tracing::debug!(seq, load_id = %event.load_id, "classified as conflict");
                self.conflict_decision(seq, &event, record)
            }
            Classification::FirstOccurrence => {
                let decision = self.first_occurrence_decision(seq, &event, keys);
                self.idempotency.install(event.load_id.clone(), fp, decision.clone());
                decision
            }
        }
    }

    fn malformed_decision(&self, seq: u64, err: &ParseError) -> Decision {
        tracing::warn!(seq, error = %err, "MALFORMED_INPUT");
        Decision {
            seq,
            load_id: err.id().unwrap_or_default().to_string(),
            customer_id: err.customer_id().unwrap_or_default().to_string(),
            status: Status::Declined,
            reasons: vec![ReasonCode::MalformedInput],
            snapshot_before: None,
            snapshot_after: None,
            canonical_seq: seq,
            effective_amount: None,
        }
    }

    fn replay_decision(
        &self,
        seq: u64,
        record: &crate::idempotency::IdempotencyRecord,
    ) -> Decision {
        let canonical = &record.canonical_decision;
        let mut reasons = canonical.reasons.clone();
        reasons.push(ReasonCode::DuplicateIdReplay);
        Decision {
            seq,
            load_id: canonical.load_id.clone(),
            customer_id: canonical.customer_id.clone(),
            status: canonical.status,
            reasons,
            snapshot_before: None,
            snapshot_after: None,
            canonical_seq: canonical.seq,
            effective_amount: canonical.effective_amount,
        }
    }

    fn conflict_decision(
        &self,
        seq: u64,
        event: &event::Event,
        record: &crate::idempotency::IdempotencyRecord,
    ) -> Decision {
        Decision {
            seq,
            load_id: event.load_id.clone(),
            customer_id: event.customer_id.clone(),
            status: Status::Declined,
            reasons: vec![ReasonCode::DuplicateIdConflict],
            snapshot_before: None,
            snapshot_after: None,
            canonical_seq: record.canonical_decision.seq,
            effective_amount: None,
        }
    }

    fn first_occurrence_decision(
        &mut self,
        seq: u64,
        event: &event::Event,
        keys: time_keys::TimeKeys,
    ) -> Decision {
        let features = features::derive(event, self.scenario.multiplier);

        let snapshot_before =
            self.window
                .snapshot(&event.customer_id, keys.day_key, keys.week_key);

        let window_ref = &self.window;
        let verdict = policy::evaluate(
            &self.scenario.limits,
            keys.day_key,
            snapshot_before,
            &features,
            |day, name| window_ref.global_gate_count(day, name),
        );

        tracing::debug!(
            seq,
            load_id = %event.load_id,
            accepted = verdict.accepted,
            "policy evaluated"
        );

        let deltas = crate::commit::deltas_for(&verdict, &features);
        self.window
            .commit(&event.customer_id, keys.day_key, keys.week_key, &deltas);

        let snapshot_after =
            self.window
                .snapshot(&event.customer_id, keys.day_key, keys.week_key);

        Decision {
            seq,
            load_id: event.load_id.clone(),
            customer_id: event.customer_id.clone(),
            status: if verdict.accepted {
                Status::Accepted
            } else {
                Status::Declined
            },
            reasons: verdict.reasons,
            snapshot_before: Some(snapshot_before),
            snapshot_after: Some(snapshot_after),
            canonical_seq: seq,
            effective_amount: Some(features.effective_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioBuilder;

    fn driver() -> Driver {
        Driver::new(ScenarioBuilder::baseline().build().unwrap())
    }

    fn record(seq: u64, id: &str, customer: &str, amount: &str, time: &str) -> RawRecord {
        RawRecord::new(
            seq,
            format!(
                r#"{{"id":"{id}","customer_id":"{customer}","load_amount":"{amount}","time":"{time}"}}"#
            ),
        )
    }

    #[test]
    fn replay_mirrors_canonical_and_adds_marker() {
        let mut driver = driver();
        let r0 = record(0, "A", "1", "$100.00", "2024-01-01T10:00:00Z");
        let r1 = r0.clone_with_seq(1);
        let d0 = driver.process(r0);
        let d1 = driver.process(r1);
        assert!(d0.accepted());
        assert!(d1.accepted());
        assert_eq!(d1.canonical_seq, 0);
        assert!(d1.reasons.contains(&ReasonCode::DuplicateIdReplay));
    }

    #[test]
    fn conflicting_payload_is_declined_and_does_not_mutate_state() {
        let mut driver = driver();
        let r0 = record(0, "B", "1", "USD100.00", "2024-01-01T11:00:00Z");
        let r1 = record(1, "B", "1", "USD200.00", "2024-01-01T11:05:00Z");
        let d0 = driver.process(r0);
        let d1 = driver.process(r1);
        assert!(d0.accepted());
        assert!(!d1.accepted());
        assert_eq!(d1.reasons, vec![ReasonCode::DuplicateIdConflict]);
        assert_eq!(d1.canonical_seq, 0);
    }

    #[test]
    fn malformed_record_declines_without_touching_state() {
        let mut driver = driver();
        let bad = RawRecord::new(0, "not json".to_string());
        let decision = driver.process(bad);
        assert!(!decision.accepted());
        assert_eq!(decision.reasons, vec![ReasonCode::MalformedInput]);
    }

    #[test]
    fn fourth_distinct_attempt_same_day_hits_attempt_limit() {
        let mut driver = driver();
        let mut last = None;
        for (i, id) in ["X1", "X2", "X3", "X4"].iter().enumerate() {
            let r = record(i as u64, id, "1", "$10.00", "2024-01-01T10:00:00Z");
            last = Some(driver.process(r));
        }
        let d = last.unwrap();
        assert!(!d.accepted());
        assert_eq!(d.reasons, vec![ReasonCode::DailyAttemptLimit]);
    }
}

#[cfg(test)]
impl RawRecord {
    fn clone_with_seq(&self, seq: u64) -> RawRecord {
        RawRecord::new(seq, self.body.clone())
    }
}
