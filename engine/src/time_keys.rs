//! Time-key derivation (C2)
//!
//! Given an event instant, computes the two calendar labels used to bucket
//! window state: the UTC calendar day, and the UTC date of the Monday that
//! begins the ISO week containing the instant.
//!
//! No other computation belongs here: keeping this module a pure, total
//! function of `event_time` keeps window keying deterministic and
//! audit-stable across platforms and implementation revisions.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// UTC calendar date used as a window bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// UTC date of the Monday beginning the ISO week, used as a window bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub fn monday(self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// The pair of bucket keys derived from a single event instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeKeys {
    pub day_key: DayKey,
    pub week_key: WeekKey,
}

/// Derive `(day_key, week_key)` from a UTC instant.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use load_adjudication_engine::time_keys::derive;
///
/// // Sunday, one second before the ISO-Monday boundary.
/// let sunday = Utc.with_ymd_and_hms(2024, 1, 7, 23, 59, 59).unwrap();
/// let monday = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
///
/// let sunday_keys = derive(sunday);
/// let monday_keys = derive(monday);
/// assert_ne!(sunday_keys.week_key, monday_keys.week_key);
/// ```
pub fn derive(event_time: DateTime<Utc>) -> TimeKeys {
    let date = event_time.date_naive();
    let day_key = DayKey(date);

    let days_since_monday = date.weekday().num_days_from_monday() as u64;
    let monday = date
        .checked_sub_days(Days::new(days_since_monday))
        .expect("ISO week Monday computation must not underflow NaiveDate range");
    debug_assert_eq!(monday.weekday(), Weekday::Mon);

    TimeKeys {
        day_key,
        week_key: WeekKey(monday),
    }
}
