//! Report command: time per domain, all-time or for the current day.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use wt_core::{Clock, Request, bucket, format_duration};
use wt_store::Store;
use wt_tracker::Coordinator;

/// Which totals a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    AllTime,
    Today,
}

/// Sites below this are left out of reports unless asked otherwise.
pub const DEFAULT_MIN_SECS: u64 = 10;

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub domain: String,
    pub ms: i64,
    /// Share of the grand total, rounded to one decimal.
    pub percent: f64,
}

/// Everything needed to render a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub scope: Scope,
    /// Local calendar day, present for [`Scope::Today`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub timezone: String,
    /// Every recorded millisecond, including domains below `min_ms`.
    pub total_ms: i64,
    pub min_ms: i64,
    /// Domains with time recorded but below `min_ms`.
    pub hidden: usize,
    pub domains: Vec<ReportEntry>,
}

#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond totals stay far below 2^52"
)]
fn percent_of(ms: i64, total_ms: i64) -> f64 {
    if total_ms <= 0 {
        return 0.0;
    }
    (ms as f64 / total_ms as f64 * 1000.0).round() / 10.0
}

/// Builds report rows, longest time first. Ties sort by domain.
///
/// Domains under `min_ms` are counted in the total but not listed.
pub fn build_report(
    totals: BTreeMap<String, i64>,
    scope: Scope,
    min_ms: i64,
    generated_at: DateTime<Utc>,
    timezone: String,
) -> ReportData {
    let recorded: Vec<(String, i64)> = totals.into_iter().filter(|(_, ms)| *ms > 0).collect();
    let total_ms = recorded.iter().map(|(_, ms)| *ms).fold(0_i64, i64::saturating_add);

    let mut domains: Vec<ReportEntry> = recorded
        .iter()
        .filter(|(_, ms)| *ms >= min_ms)
        .map(|(domain, ms)| ReportEntry {
            domain: domain.clone(),
            ms: *ms,
            percent: percent_of(*ms, total_ms),
        })
        .collect();
    domains.sort_by(|a, b| b.ms.cmp(&a.ms).then_with(|| a.domain.cmp(&b.domain)));
    let hidden = recorded.len() - domains.len();

    let day = match scope {
        Scope::Today => Some(bucket::day_string(bucket::local_day(generated_at))),
        Scope::AllTime => None,
    };

    ReportData {
        generated_at,
        scope,
        day,
        timezone,
        total_ms,
        min_ms,
        hidden,
        domains,
    }
}

/// Renders a 10-cell bar of `value` relative to `max`.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is clamped to 0..=10 before the cast"
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░".repeat(10);
    }
    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Formats the human-readable report.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    match &data.day {
        Some(day) => writeln!(output, "TIME TODAY: {day}").unwrap(),
        None => writeln!(output, "TIME: ALL TIME").unwrap(),
    }

    if data.domains.is_empty() {
        writeln!(output).unwrap();
        if data.hidden == 0 {
            writeln!(output, "No time recorded.").unwrap();
        } else {
            writeln!(output, "No site reached {}s.", data.min_ms / 1000).unwrap();
        }
        return output;
    }

    let width = data
        .domains
        .iter()
        .map(|e| e.domain.len())
        .max()
        .unwrap_or(0);

    writeln!(output).unwrap();
    for entry in &data.domains {
        let duration = format_duration(entry.ms);
        let bar = progress_bar(entry.ms, data.total_ms);
        writeln!(
            output,
            "{:<width$}  {duration:>7}  {:>5.1}%  {bar}",
            entry.domain, entry.percent
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_duration(data.total_ms)).unwrap();
    if data.hidden > 0 {
        writeln!(
            output,
            "{} more under {}s not shown.",
            data.hidden,
            data.min_ms / 1000
        )
        .unwrap();
    }
    output
}

/// Formats the report as pretty-printed JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    serde_json::to_string_pretty(data).context("failed to serialize report")
}

/// Runs the report command.
pub async fn run<W, S, C>(
    writer: &mut W,
    coordinator: &mut Coordinator<S, C>,
    today: bool,
    json: bool,
    min_secs: u64,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: Store,
    C: Clock,
{
    let (request, scope) = if today {
        (Request::GetTodayData, Scope::Today)
    } else {
        (Request::GetTimeData, Scope::AllTime)
    };
    let totals = coordinator
        .handle_request(request)
        .await
        .into_totals()
        .unwrap_or_default();

    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let min_ms = i64::try_from(min_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
    let data = build_report(totals, scope, min_ms, now, timezone);

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }
    Ok(())
}
