//! Payload fingerprinting for the idempotency gate (C3)
//!
//! A fingerprint is a deterministic SHA-256 digest over a canonical byte
//! encoding of every non-identifier field of an `Event`: `customer_id`,
//! `event_time`, and `amount`. `load_id` is intentionally excluded: the
//! fingerprint answers "is this the same payload under a possibly-reused
//! identifier", not "is this the same identifier".
//!
//! The canonical encoding is field-tagged and length-prefixed so that no
//! combination of field values can produce the same byte stream by
//! shifting a separator; it matches the canonicalize-then-hash shape this
//! codebase already uses for config digests.

use crate::event::Event;
use sha2::{Digest, Sha256};

/// A stable, deterministic hash of an event's non-identifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

/// Compute the fingerprint of an event's `(customer_id, event_time, amount)`.
///
/// # Example
/// ```
/// use load_adjudication_engine::event::Event;
/// use load_adjudication_engine::fingerprint::compute;
/// use load_adjudication_engine::money::Money;
/// use chrono::{TimeZone, Utc};
///
/// let e1 = Event {
///     load_id: "A".to_string(),
///     customer_id: "1".to_string(),
///     event_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
///     amount: Money::from_minor_units(10000),
///     raw_amount_text: "$100.00".to_string(),
///     seq: 0,
/// };
/// let mut e2 = e1.clone();
/// e2.load_id = "B".to_string(); // different id, same payload
///
/// assert_eq!(compute(&e1), compute(&e2));
/// ```
pub fn compute(event: &Event) -> Fingerprint {
    let mut hasher = Sha256::new();

    write_field(&mut hasher, b"customer_id", event.customer_id.as_bytes());
    write_field(
        &mut hasher,
        b"event_time_ns",
        &event
            .event_time
            .timestamp_nanos_opt()
            .unwrap_or(event.event_time.timestamp() * 1_000_000_000)
            .to_be_bytes(),
    );
    write_field(&mut hasher, b"amount_minor", &event.amount.minor_units().to_be_bytes());

    Fingerprint(hasher.finalize().into())
}

/// Write a length-prefixed, tagged field into the running hash so that
/// field boundaries can never be confused with field content.
fn write_field(hasher: &mut Sha256, tag: &[u8], value: &[u8]) {
    hasher.update((tag.len() as u32).to_be_bytes());
    hasher.update(tag);
    hasher.update((value.len() as u32).to_be_bytes());
    hasher.update(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::{TimeZone, Utc};

    fn event(load_id: &str, customer_id: &str, amount_minor: i64, hour: u32) -> Event {
        Event {
            load_id: load_id.to_string(),
            customer_id: customer_id.to_string(),
            event_time: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            amount: Money::from_minor_units(amount_minor),
            raw_amount_text: String::new(),
            seq: 0,
        }
    }

    #[test]
    fn identical_non_identifier_fields_collide_regardless_of_load_id() {
        let a = event("A", "1", 10000, 10);
        let b = event("B", "1", 10000, 10);
        assert_eq!(compute(&a), compute(&b));
    }

    #[test]
    fn differing_amount_changes_fingerprint() {
        let a = event("A", "1", 10000, 10);
        let b = event("A", "1", 20000, 10);
        assert_ne!(compute(&a), compute(&b));
    }

    #[test]
    fn differing_customer_changes_fingerprint() {
        let a = event("A", "1", 10000, 10);
        let b = event("A", "2", 10000, 10);
        assert_ne!(compute(&a), compute(&b));
    }

    #[test]
    fn differing_time_changes_fingerprint() {
        let a = event("A", "1", 10000, 10);
        let b = event("A", "1", 10000, 11);
        assert_ne!(compute(&a), compute(&b));
    }

    #[test]
    fn hex_encoding_is_64_lowercase_hex_chars() {
        let fp = compute(&event("A", "1", 10000, 10));
        let hex = fp.as_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
