//! Status command: where data lives and what it holds.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wt_core::bucket::{self, KeyKind};
use wt_core::{Clock, format_duration};
use wt_store::Store;
use wt_tracker::Coordinator;
use wt_tracker::ledger::day_totals;

pub async fn run<W, S, C>(
    writer: &mut W,
    coordinator: &Coordinator<S, C>,
    database_path: &Path,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: Store,
    C: Clock,
{
    let entries = coordinator
        .store()
        .get_all()
        .await
        .with_context(|| format!("failed to read {}", database_path.display()))?;

    let domains = entries
        .keys()
        .filter(|key| matches!(bucket::classify_key(key), KeyKind::Lifetime { .. }))
        .count();
    let today = bucket::local_day(now);
    let today_totals = day_totals(&entries, today);
    let today_ms = today_totals.values().fold(0_i64, |acc, ms| acc.saturating_add(*ms));
    let widget = if coordinator.timer_enabled().await {
        "shown"
    } else {
        "hidden"
    };

    writeln!(writer, "Web time tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Timezone: {timezone}")?;
    writeln!(writer, "Timer widget: {widget}")?;
    writeln!(writer, "Domains tracked: {domains}")?;
    writeln!(
        writer,
        "Today ({}): {} across {} domain(s)",
        bucket::day_string(today),
        format_duration(today_ms),
        today_totals.len()
    )?;
    Ok(())
}
