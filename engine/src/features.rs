//! Feature derivation (C4)
//!
//! A pure, side-effect-free function of an `Event` and the scenario's
//! configuration: computes the effective amount after any risk multiplier,
//! and a closed set of boolean tags the policy evaluator (C6) reads.
//!
//! Tags are a fixed struct, not an open map; this codebase represents
//! derived properties with a known field set chosen at scenario build,
//! never a schemaless bag of key/value pairs.

use crate::event::Event;
use crate::money::Money;
use chrono::{DateTime, Utc};

/// Closed set of boolean properties derived from an event, consumed by
/// policy rules (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tags {
    /// True iff `load_id` parses as a non-negative integer that is prime.
    /// Undefined (`false`) when `load_id` doesn't parse as an integer.
    pub is_prime_id: bool,
}

/// Result of feature derivation for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub effective_amount: Money,
    pub tags: Tags,
}

/// A scenario-configured risk multiplier, expressed as a rational
/// `(numerator, denominator)` so the result can be rounded with
/// banker's rounding rather than floating point. The baseline scenario
/// uses the identity multiplier.
pub type MultiplierFn = fn(DateTime<Utc>, Tags) -> (i64, i64);

/// The identity multiplier: `effective_amount == amount`.
pub fn identity_multiplier(_event_time: DateTime<Utc>, _tags: Tags) -> (i64, i64) {
    (1, 1)
}

/// Derive features for one event under a given multiplier function.
///
/// # Example
/// ```
/// use load_adjudication_engine::event::Event;
/// use load_adjudication_engine::features::{derive, identity_multiplier};
/// use load_adjudication_engine::money::Money;
/// use chrono::{TimeZone, Utc};
///
/// let event = Event {
///     load_id: "7".to_string(),
///     customer_id: "1".to_string(),
///     event_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     amount: Money::from_minor_units(1000),
///     raw_amount_text: String::new(),
///     seq: 0,
/// };
/// let features = derive(&event, identity_multiplier);
/// assert_eq!(features.effective_amount, event.amount);
/// assert!(features.tags.is_prime_id);
/// ```
pub fn derive(event: &Event, multiplier: MultiplierFn) -> Features {
    let tags = Tags {
        is_prime_id: is_prime_load_id(&event.load_id),
    };
    let (numerator, denominator) = multiplier(event.event_time, tags);
    let effective_amount = event.amount.scaled_round_half_even(numerator, denominator);

    Features {
        effective_amount,
        tags,
    }
}

/// Primality is defined only when `load_id` parses as a non-negative
/// integer; any other form (non-numeric, negative) yields `false`.
fn is_prime_load_id(load_id: &str) -> bool {
    match load_id.parse::<u64>() {
        Ok(n) => is_prime(n),
        Err(_) => false,
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3u64;
    while divisor.saturating_mul(divisor) <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}
