//! Parser & normalizer (C1)
//!
//! Decodes a `RawRecord` body into an `Event`, normalizing the dirty
//! currency-prefixed amount text into fixed-point `Money` and the ISO-8601
//! timestamp into a UTC instant.
//!
//! CRITICAL: normalization never falls back to floating point; a residue
//! that doesn't parse cleanly as a scale-2 decimal is a `ParseError`, not a
//! best-effort guess.

use crate::money::Money;
use crate::record::RawRecord;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Wire shape of one input record (§6.1).
#[derive(Debug, Deserialize)]
struct InputLine {
    id: String,
    customer_id: String,
    load_amount: String,
    time: String,
}

/// Errors raised while decoding and normalizing a raw record.
///
/// `id`/`customer_id` are carried along when they were successfully
/// decoded, so the driver can still label the resulting decline decision
/// with the identifiers the caller sent. Only a body that fails to
/// decode at all leaves them unknown.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("malformed record body: {0}")]
    MalformedBody(String),

    #[error("unparseable or negative amount: {text:?}")]
    InvalidAmount {
        id: String,
        customer_id: String,
        text: String,
    },

    #[error("unparseable event time: {text:?}")]
    InvalidTime {
        id: String,
        customer_id: String,
        text: String,
    },
}

impl ParseError {
    /// The load id, when the record decoded far enough to have one.
    pub fn id(&self) -> Option<&str> {
        match self {
            ParseError::MalformedBody(_) => None,
            ParseError::InvalidAmount { id, .. } | ParseError::InvalidTime { id, .. } => Some(id),
        }
    }

    /// The customer id, when the record decoded far enough to have one.
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            ParseError::MalformedBody(_) => None,
            ParseError::InvalidAmount { customer_id, .. }
            | ParseError::InvalidTime { customer_id, .. } => Some(customer_id),
        }
    }
}

/// A decoded, normalized fund-load attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Opaque load identifier. May additionally parse as a non-negative
    /// integer, which feature derivation (C4) uses for tag computation.
    pub load_id: String,

    /// Opaque customer identifier.
    pub customer_id: String,

    /// Event instant, normalized to UTC.
    pub event_time: DateTime<Utc>,

    /// Normalized amount, scale 2, non-negative.
    pub amount: Money,

    /// Original amount text, preserved for audit.
    pub raw_amount_text: String,

    /// Transport sequence number; the sole ordering authority for output.
    pub seq: u64,
}

/// Parse a raw record into an `Event`.
///
/// # Example
/// ```
/// use load_adjudication_engine::record::RawRecord;
/// use load_adjudication_engine::event::parse;
///
/// let raw = RawRecord::new(0, r#"{"id":"A","customer_id":"1","load_amount":"$100.00","time":"2024-01-01T10:00:00Z"}"#);
/// let event = parse(&raw).unwrap();
/// assert_eq!(event.amount.to_string(), "100.00");
/// ```
pub fn parse(raw: &RawRecord) -> Result<Event, ParseError> {
    let line: InputLine = serde_json::from_str(&raw.body)
        .map_err(|e| ParseError::MalformedBody(e.to_string()))?;

    let amount = normalize_amount(&line.load_amount).ok_or_else(|| ParseError::InvalidAmount {
        id: line.id.clone(),
        customer_id: line.customer_id.clone(),
        text: line.load_amount.clone(),
    })?;
    let event_time = parse_event_time(&line.time).ok_or_else(|| ParseError::InvalidTime {
        id: line.id.clone(),
        customer_id: line.customer_id.clone(),
        text: line.time.clone(),
    })?;

    Ok(Event {
        load_id: line.id,
        customer_id: line.customer_id,
        event_time,
        amount,
        raw_amount_text: line.load_amount,
        seq: raw.seq,
    })
}

/// Normalize dirty currency-prefixed amount text into scale-2 `Money`.
///
/// 1. Strip all whitespace.
/// 2. Strip a leading sequence of `USD`/`$` tokens, matched at most twice
///    (covers `USD`, `$`, `USD$`, `$USD`).
/// 3. Parse the residue as a non-negative scale-2 decimal.
fn normalize_amount(raw: &str) -> Option<Money> {
    let mut residue: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    for _ in 0..2 {
        if let Some(rest) = residue.strip_prefix("USD") {
            residue = rest.to_string();
        } else if let Some(rest) = residue.strip_prefix('$') {
            residue = rest.to_string();
        } else {
            break;
        }
    }

    parse_minor_units(&residue).map(Money::from_minor_units)
}

/// Parse a residue string as minor units of a scale-2 decimal. Returns
/// `None` for anything that isn't a plain non-negative `digits[.digits]`
/// form; in particular a leading `-` fails here rather than being
/// silently accepted.
fn parse_minor_units(residue: &str) -> Option<i64> {
    if residue.is_empty() {
        return None;
    }
    let mut parts = residue.splitn(2, '.');
    let whole_part = parts.next().unwrap();
    let frac_part = parts.next();

    if whole_part.is_empty() || !whole_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole_part.parse().ok()?;

    let cents: i64 = match frac_part {
        None => 0,
        Some(f) if f.len() <= 2 && !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
            let padded = format!("{:0<2}", f);
            padded.parse().ok()?
        }
        Some(_) => return None,
    };

    whole.checked_mul(100)?.checked_add(cents)
}

/// Parse an ISO-8601 timestamp with timezone and convert to a UTC instant.
fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
