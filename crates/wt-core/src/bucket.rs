//! Store key scheme for lifetime totals and per-day buckets.
//!
//! Key space:
//! - `<domain>` holds lifetime milliseconds.
//! - `<domain>_today_<YYYY-MM-DD>` holds milliseconds for one local calendar day.
//! - `timerEnabled` holds the widget visibility flag.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::types::Domain;

/// Store key of the process-wide widget enable flag.
pub const TIMER_ENABLED_KEY: &str = "timerEnabled";

/// Separator between a domain and the date of its day bucket.
const DAY_MARKER: &str = "_today_";

/// Classification of a raw store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'a> {
    /// Lifetime total for a domain.
    Lifetime { domain: &'a str },
    /// Day bucket for a domain.
    Day { domain: &'a str, date: &'a str },
    /// The widget enable flag.
    TimerEnabled,
}

/// Returns the local calendar day an instant falls on.
///
/// Day buckets roll over at local midnight.
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Renders the date component used in day bucket keys.
pub fn day_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Key of a domain's lifetime total.
pub fn lifetime_key(domain: &Domain) -> String {
    domain.as_str().to_string()
}

/// Key of a domain's bucket for the given day.
pub fn day_key(domain: &Domain, date: NaiveDate) -> String {
    format!("{domain}{DAY_MARKER}{}", day_string(date))
}

/// Suffix shared by every day bucket key of the given day.
pub fn day_suffix(date: NaiveDate) -> String {
    format!("{DAY_MARKER}{}", day_string(date))
}

/// Classifies a raw store key.
pub fn classify_key(key: &str) -> KeyKind<'_> {
    if key == TIMER_ENABLED_KEY {
        return KeyKind::TimerEnabled;
    }
    match key.rsplit_once(DAY_MARKER) {
        Some((domain, date)) => KeyKind::Day { domain, date },
        None => KeyKind::Lifetime { domain: key },
    }
}

/// Recovers the domain from a day bucket key if it belongs to `date`.
pub fn domain_for_day(key: &str, date: NaiveDate) -> Option<&str> {
    key.strip_suffix(&day_suffix(date))
        .filter(|domain| !domain.is_empty())
}
