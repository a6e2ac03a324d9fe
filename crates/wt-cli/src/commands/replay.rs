//! Replay command: feeds a recorded log of browser events through the
//! coordinator so their time lands in the store.
//!
//! The log is JSON lines. Every line carries an RFC 3339 `at` timestamp and
//! a `type`:
//!
//! ```text
//! {"at":"2025-03-07T09:00:00Z","type":"tab_activated","tab_id":1,"url":"https://example.com/"}
//! {"at":"2025-03-07T09:00:04Z","type":"tab_updated","tab_id":1,"url":"https://docs.rs/","complete":true,"active":true}
//! {"at":"2025-03-07T09:00:09Z","type":"window_focus","window_id":null}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use wt_core::{ManualClock, TabId, TrackerConfig, format_elapsed};
use wt_store::Store;
use wt_tracker::{BrowserEvent, Coordinator, TabSource};

#[derive(Debug, Deserialize)]
struct ReplayLine {
    at: DateTime<Utc>,
    #[serde(flatten)]
    event: ReplayEvent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayEvent {
    TabActivated {
        tab_id: i64,
        url: Option<String>,
    },
    TabUpdated {
        tab_id: i64,
        url: Option<String>,
        #[serde(default)]
        complete: bool,
        #[serde(default)]
        active: bool,
    },
    WindowFocus {
        window_id: Option<i64>,
        /// Active tab of the newly focused window.
        tab_id: Option<i64>,
    },
}

/// Tab state reconstructed from the log as it is replayed.
#[derive(Debug, Default)]
struct ReplayTabs {
    urls: HashMap<TabId, String>,
    focused: Option<TabId>,
}

impl ReplayTabs {
    /// Updates known tabs and converts the line into a coordinator event.
    fn apply(&mut self, event: ReplayEvent) -> BrowserEvent {
        match event {
            ReplayEvent::TabActivated { tab_id, url } => {
                let tab_id = TabId(tab_id);
                self.remember(tab_id, url);
                self.focused = Some(tab_id);
                BrowserEvent::TabActivated { tab_id }
            }
            ReplayEvent::TabUpdated {
                tab_id,
                url,
                complete,
                active,
            } => {
                let tab_id = TabId(tab_id);
                self.remember(tab_id, url);
                if active {
                    self.focused = Some(tab_id);
                }
                BrowserEvent::TabUpdated {
                    tab_id,
                    complete,
                    active,
                }
            }
            ReplayEvent::WindowFocus { window_id, tab_id } => {
                if let Some(tab_id) = tab_id {
                    self.focused = Some(TabId(tab_id));
                }
                BrowserEvent::WindowFocusChanged { window_id }
            }
        }
    }

    fn remember(&mut self, tab_id: TabId, url: Option<String>) {
        if let Some(url) = url {
            self.urls.insert(tab_id, url);
        }
    }
}

impl TabSource for ReplayTabs {
    async fn tab_url(&self, tab_id: TabId) -> Option<String> {
        self.urls.get(&tab_id).cloned()
    }

    async fn focused_tab(&self) -> Option<TabId> {
        self.focused
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub accounted_ms: i64,
}

/// Replays the log at `path` into `store`.
///
/// Time still being tracked after the last line is flushed as of that line.
pub async fn run<W, S>(
    writer: &mut W,
    store: S,
    config: TrackerConfig,
    path: &Path,
) -> Result<ReplaySummary>
where
    W: Write,
    S: Store,
{
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let summary = replay(&contents, store, config).await?;

    writeln!(
        writer,
        "Replayed {} events, {} accounted.",
        summary.events,
        format_elapsed(summary.accounted_ms)
    )?;
    Ok(summary)
}

async fn replay<S: Store>(contents: &str, store: S, config: TrackerConfig) -> Result<ReplaySummary> {
    let mut tabs = ReplayTabs::default();
    let mut session: Option<(Coordinator<S, ManualClock>, ManualClock)> = None;
    let mut last_at: Option<DateTime<Utc>> = None;
    let mut events = 0;

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(line)
            .with_context(|| format!("line {line_no}: invalid event"))?;

        if let Some(previous) = last_at {
            if parsed.at < previous {
                bail!("line {line_no}: event at {} is earlier than {previous}", parsed.at);
            }
        }
        last_at = Some(parsed.at);

        let (coordinator, clock) = session.get_or_insert_with(|| {
            let clock = ManualClock::new(parsed.at);
            (
                Coordinator::new(store.clone(), clock.clone(), config.clone()),
                clock,
            )
        });
        clock.set(parsed.at);

        let event = tabs.apply(parsed.event);
        tracing::trace!(line = line_no, ?event, "replaying");
        coordinator.handle_event(event, &tabs).await;
        events += 1;
    }

    let accounted_ms = match session {
        Some((mut coordinator, _)) => {
            coordinator.stop();
            coordinator.settle().await;
            coordinator.debug_info().flushed_ms
        }
        None => 0,
    };

    Ok(ReplaySummary {
        events,
        accounted_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use wt_store::MemoryStore;
    use wt_tracker::ledger::lifetime_totals;

    const LOG: &str = r#"
# morning session
{"at":"2025-03-07T09:00:00Z","type":"tab_activated","tab_id":1,"url":"https://example.com/a"}
{"at":"2025-03-07T09:00:05Z","type":"tab_activated","tab_id":2,"url":"https://docs.rs/tokio"}
{"at":"2025-03-07T09:00:05.500Z","type":"tab_activated","tab_id":1}
{"at":"2025-03-07T09:00:08.500Z","type":"window_focus","window_id":null}
{"at":"2025-03-07T09:01:00Z","type":"window_focus","window_id":3,"tab_id":2}
{"at":"2025-03-07T09:01:04Z","type":"tab_updated","tab_id":2,"url":"chrome://settings","complete":true,"active":true}
"#;

    #[tokio::test]
    async fn test_replay_accounts_focused_time() {
        let store = MemoryStore::new();
        let summary = replay(LOG, store.clone(), TrackerConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.events, 6);
        // 5s + 3s on example.com, 4s on docs.rs; the 500ms hop is discarded
        assert_eq!(summary.accounted_ms, 12_000);

        let totals = lifetime_totals(&store.snapshot());
        assert_eq!(totals.get("example.com"), Some(&8_000));
        assert_eq!(totals.get("docs.rs"), Some(&4_000));
        assert_eq!(totals.len(), 2);
    }

    #[tokio::test]
    async fn test_replay_flushes_trailing_session_at_last_event() {
        let log = r#"{"at":"2025-03-07T09:00:00Z","type":"tab_activated","tab_id":1,"url":"https://a.com"}
{"at":"2025-03-07T09:00:30Z","type":"tab_updated","tab_id":1,"complete":false,"active":true}"#;
        let store = MemoryStore::new();
        let summary = replay(log, store.clone(), TrackerConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.accounted_ms, 30_000);
        assert_eq!(lifetime_totals(&store.snapshot()).get("a.com"), Some(&30_000));
    }

    #[tokio::test]
    async fn test_failed_writes_are_not_accounted() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let summary = replay(LOG, store.clone(), TrackerConfig::default())
            .await
            .unwrap();

        assert_eq!(summary.events, 6);
        assert_eq!(summary.accounted_ms, 0);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_replay_rejects_out_of_order_lines() {
        let log = r#"{"at":"2025-03-07T09:00:10Z","type":"tab_activated","tab_id":1,"url":"https://a.com"}
{"at":"2025-03-07T09:00:00Z","type":"window_focus","window_id":null}"#;
        let err = replay(log, MemoryStore::new(), TrackerConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("line 2: event at"));
    }

    #[tokio::test]
    async fn test_replay_reports_bad_line_number() {
        let log = "\n{\"at\":\"2025-03-07T09:00:00Z\",\"type\":\"tab_closed\",\"tab_id\":1}\n";
        let err = replay(log, MemoryStore::new(), TrackerConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "line 2: invalid event");
    }

    #[tokio::test]
    async fn test_run_prints_summary() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        std::fs::write(&path, LOG).unwrap();

        let mut output = Vec::new();
        run(&mut output, MemoryStore::new(), TrackerConfig::default(), &path)
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Replayed 6 events, 12s accounted.\n"
        );
    }

    #[tokio::test]
    async fn test_empty_log_replays_nothing() {
        let summary = replay("# nothing\n", MemoryStore::new(), TrackerConfig::default())
            .await
            .unwrap();
        assert_eq!(summary, ReplaySummary { events: 0, accounted_ms: 0 });
    }
}
