//! Store-side accounting: adding time and reading totals back.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;
use wt_core::bucket::{self, KeyKind};
use wt_core::{DeltaMs, Domain};
use wt_store::{Entries, Store, StoreError, int_value};

/// Adds `delta` to a domain's lifetime total and to its bucket for `day`.
///
/// Both keys are read, incremented and written back in a single `set`.
/// There is no locking: two concurrent calls for the same domain can both
/// read the old totals, and one increment is then lost.
pub async fn accrue<S: Store>(
    store: &S,
    domain: &Domain,
    delta: DeltaMs,
    day: NaiveDate,
) -> Result<(), StoreError> {
    let total_key = bucket::lifetime_key(domain);
    let day_key = bucket::day_key(domain, day);
    let keys = [total_key, day_key];

    let current = store.get(&keys).await?;
    let [total_key, day_key] = keys;
    let total = int_value(&current, &total_key).saturating_add(delta.value());
    let today = int_value(&current, &day_key).saturating_add(delta.value());

    store
        .set(Entries::from([
            (total_key, Value::from(total)),
            (day_key, Value::from(today)),
        ]))
        .await?;
    tracing::debug!(%domain, delta_ms = delta.value(), total, today, "accrued time");
    Ok(())
}

/// Lifetime milliseconds per domain, skipping day buckets, the enable flag
/// and any non-integer value.
pub fn lifetime_totals(entries: &Entries) -> BTreeMap<String, i64> {
    entries
        .iter()
        .filter_map(|(key, value)| match bucket::classify_key(key) {
            KeyKind::Lifetime { domain } => value.as_i64().map(|ms| (domain.to_string(), ms)),
            KeyKind::Day { .. } | KeyKind::TimerEnabled => None,
        })
        .collect()
}

/// Milliseconds per domain recorded for `day`.
pub fn day_totals(entries: &Entries, day: NaiveDate) -> BTreeMap<String, i64> {
    entries
        .iter()
        .filter_map(|(key, value)| {
            let domain = bucket::domain_for_day(key, day)?;
            value.as_i64().map(|ms| (domain.to_string(), ms))
        })
        .collect()
}
