//! Background tracking coordinator.
//!
//! The coordinator owns the process-wide notion of "which domain is the
//! focused, trackable tab" and is the only writer of aggregate totals.
//!
//! # State Machine
//!
//! ```text
//!            activate/update/focus (trackable)
//!   Idle ─────────────────────────────────────▶ Tracking(tab, domain, since)
//!    ▲                                                │
//!    └──── window blur / non-trackable tab ───────────┘
//! ```
//!
//! Every transition out of `Tracking` flushes `now - since` first. Flushes
//! under `min_flush_ms` are dropped. The store write is spawned and not
//! awaited, so `since` is always reset even if the write later fails.
//! Only writes that succeed are counted in [`DebugInfo`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::task::JoinSet;
use wt_core::bucket::{self, TIMER_ENABLED_KEY};
use wt_core::{
    Clock, DebugInfo, DeltaMs, Domain, PageBaseline, Request, Response, TabId, TrackerConfig,
    trackable_domain,
};
use wt_store::{Entries, Store};

use crate::ledger::{accrue, day_totals, lifetime_totals};

/// Tab and window notifications from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    /// A tab became the active tab of its window.
    TabActivated { tab_id: TabId },
    /// A tab's loading status changed.
    TabUpdated {
        tab_id: TabId,
        complete: bool,
        active: bool,
    },
    /// Window focus moved; `None` means no browser window has focus.
    WindowFocusChanged { window_id: Option<i64> },
}

/// Read access to the browser's tabs.
pub trait TabSource: Send + Sync {
    /// The URL currently loaded in a tab, if the tab exists and has one.
    fn tab_url(&self, tab_id: TabId) -> impl Future<Output = Option<String>> + Send;

    /// The active tab of the focused window.
    fn focused_tab(&self) -> impl Future<Output = Option<TabId>> + Send;
}

/// What the coordinator is currently accounting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Tracking {
        tab_id: TabId,
        domain: Domain,
        since: DateTime<Utc>,
    },
}

/// The background coordinator.
///
/// Constructed once when the background context starts; its state only
/// changes through [`Coordinator::handle_event`], [`Coordinator::handle_request`],
/// [`Coordinator::checkpoint`] and [`Coordinator::stop`].
pub struct Coordinator<S, C> {
    store: S,
    clock: C,
    config: TrackerConfig,
    state: TrackingState,
    flushed_ms: Arc<AtomicI64>,
    session_flushed_ms: Arc<AtomicI64>,
    page_baseline: Option<PageBaseline>,
    writes: JoinSet<()>,
}

impl<S: Store, C: Clock> Coordinator<S, C> {
    pub fn new(store: S, clock: C, config: TrackerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            state: TrackingState::Idle,
            flushed_ms: Arc::default(),
            session_flushed_ms: Arc::default(),
            page_baseline: None,
            writes: JoinSet::new(),
        }
    }

    pub const fn state(&self) -> &TrackingState {
        &self.state
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Reacts to a tab or window notification.
    pub async fn handle_event<T: TabSource>(&mut self, event: BrowserEvent, tabs: &T) {
        let now = self.clock.now();
        match event {
            BrowserEvent::TabActivated { tab_id } => self.switch_to(tab_id, now, tabs).await,
            BrowserEvent::TabUpdated {
                tab_id,
                complete: true,
                active: true,
            } => self.switch_to(tab_id, now, tabs).await,
            BrowserEvent::TabUpdated { .. } => {}
            BrowserEvent::WindowFocusChanged { window_id: None } => {
                self.transition(TrackingState::Idle, now);
            }
            BrowserEvent::WindowFocusChanged { window_id: Some(_) } => {
                match tabs.focused_tab().await {
                    Some(tab_id) => self.switch_to(tab_id, now, tabs).await,
                    None => self.transition(TrackingState::Idle, now),
                }
            }
        }
    }

    async fn switch_to<T: TabSource>(&mut self, tab_id: TabId, now: DateTime<Utc>, tabs: &T) {
        let url = tabs.tab_url(tab_id).await;
        let next = match url.as_deref().and_then(trackable_domain) {
            Some(domain) => TrackingState::Tracking {
                tab_id,
                domain,
                since: now,
            },
            None => TrackingState::Idle,
        };
        self.transition(next, now);
    }

    fn transition(&mut self, next: TrackingState, now: DateTime<Utc>) {
        self.flush(now);
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "tracking transition");
        }
        if matches!(next, TrackingState::Tracking { .. }) {
            // writes still in flight land in the previous session's counter
            self.session_flushed_ms = Arc::default();
        }
        self.state = next;
    }

    /// Flushes the running session and starts a new interval for the same tab.
    pub fn checkpoint(&mut self) {
        let now = self.clock.now();
        self.flush(now);
        if let TrackingState::Tracking { since, .. } = &mut self.state {
            *since = now;
        }
    }

    /// Flushes the running session and goes idle.
    pub fn stop(&mut self) {
        let now = self.clock.now();
        self.transition(TrackingState::Idle, now);
    }

    /// Waits for every spawned store write to finish.
    pub async fn settle(&mut self) {
        while self.writes.join_next().await.is_some() {}
    }

    fn flush(&mut self, now: DateTime<Utc>) {
        let TrackingState::Tracking { domain, since, .. } = &self.state else {
            return;
        };
        let elapsed = (now - *since).num_milliseconds();
        if elapsed < self.config.min_flush_ms {
            tracing::debug!(%domain, elapsed, "discarding short interval");
            return;
        }
        let Ok(delta) = DeltaMs::new(elapsed) else {
            return;
        };

        let store = self.store.clone();
        let domain = domain.clone();
        let day = bucket::local_day(now);
        let counters = [
            Arc::clone(&self.flushed_ms),
            Arc::clone(&self.session_flushed_ms),
        ];

        while self.writes.try_join_next().is_some() {}
        self.writes.spawn(async move {
            match accrue(&store, &domain, delta, day).await {
                Ok(()) => {
                    for counter in counters {
                        counter.fetch_add(delta.value(), Ordering::Relaxed);
                    }
                }
                Err(err) => {
                    tracing::warn!(%domain, delta_ms = delta.value(), error = %err, "flush failed");
                }
            }
        });
    }

    /// Answers a protocol request. Store failures become `success:false` or
    /// an empty mapping.
    pub async fn handle_request(&mut self, request: Request) -> Response {
        tracing::trace!(action = request.action(), "handling request");
        match request {
            Request::GetTimeData => match self.store.get_all().await {
                Ok(entries) => Response::Totals(lifetime_totals(&entries)),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read totals");
                    Response::Totals(Default::default())
                }
            },
            Request::GetTodayData => {
                let today = bucket::local_day(self.clock.now());
                match self.store.get_all().await {
                    Ok(entries) => Response::Totals(day_totals(&entries, today)),
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read today's totals");
                        Response::Totals(Default::default())
                    }
                }
            }
            Request::ClearData => match self.store.clear().await {
                Ok(()) => {
                    tracing::info!("cleared all tracking data");
                    Response::ok()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to clear data");
                    Response::failed()
                }
            },
            Request::IncrementTime { domain, time_spent } => {
                self.increment(domain, time_spent).await
            }
            Request::TimerStarted { domain, timestamp } => {
                self.record_baseline(domain, timestamp, false)
            }
            Request::TimerResumed { domain, timestamp } => {
                self.record_baseline(domain, timestamp, true)
            }
            Request::GetDebugInfo => Response::Debug(self.debug_info()),
            Request::ToggleTimer { enabled } => {
                let entries = Entries::from([(TIMER_ENABLED_KEY.to_string(), Value::Bool(enabled))]);
                match self.store.set(entries).await {
                    Ok(()) => {
                        tracing::info!(enabled, "timer visibility changed");
                        Response::ok()
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to persist timer flag");
                        Response::failed()
                    }
                }
            }
        }
    }

    async fn increment(&self, domain: String, time_spent: i64) -> Response {
        let validated = Domain::new(domain).and_then(|d| Ok((d, DeltaMs::new(time_spent)?)));
        let (domain, delta) = match validated {
            Ok(valid) => valid,
            Err(err) => {
                tracing::debug!(error = %err, "rejected incrementTime");
                return Response::failed();
            }
        };

        let day = bucket::local_day(self.clock.now());
        match accrue(&self.store, &domain, delta, day).await {
            Ok(()) => Response::ok(),
            Err(err) => {
                tracing::warn!(%domain, error = %err, "incrementTime failed");
                Response::failed()
            }
        }
    }

    // Instrumentation only: baselines feed getDebugInfo and never move totals.
    fn record_baseline(&mut self, domain: String, timestamp: i64, resumed: bool) -> Response {
        self.page_baseline = Some(PageBaseline {
            domain,
            timestamp,
            resumed,
        });
        Response::ok()
    }

    /// Snapshot of the tracking state.
    pub fn debug_info(&self) -> DebugInfo {
        let (tab_id, domain, since) = match &self.state {
            TrackingState::Idle => (None, None, None),
            TrackingState::Tracking {
                tab_id,
                domain,
                since,
            } => (Some(*tab_id), Some(domain.clone()), Some(*since)),
        };
        DebugInfo {
            tracking_active: tab_id.is_some(),
            current_tab_id: tab_id,
            current_domain: domain,
            tracking_since: since,
            flushed_ms: self.flushed_ms.load(Ordering::Relaxed),
            session_flushed_ms: self.session_flushed_ms.load(Ordering::Relaxed),
            page_baseline: self.page_baseline.clone(),
        }
    }

    /// Whether the page widget should be shown. A missing flag means shown;
    /// an unreadable store means hidden.
    pub async fn timer_enabled(&self) -> bool {
        match self.store.get(&[TIMER_ENABLED_KEY.to_string()]).await {
            Ok(entries) => entries
                .get(TIMER_ENABLED_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(true),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read timer flag");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use chrono::Duration;
    use wt_core::ManualClock;
    use wt_store::{MemoryStore, int_value};

    use super::*;

    #[derive(Default)]
    struct FakeTabs {
        urls: HashMap<TabId, String>,
        focused: Option<TabId>,
    }

    impl FakeTabs {
        fn with(mut self, id: i64, url: &str) -> Self {
            self.urls.insert(TabId(id), url.to_string());
            self
        }

        fn focused(mut self, id: i64) -> Self {
            self.focused = Some(TabId(id));
            self
        }
    }

    impl TabSource for FakeTabs {
        async fn tab_url(&self, tab_id: TabId) -> Option<String> {
            self.urls.get(&tab_id).cloned()
        }

        async fn focused_tab(&self) -> Option<TabId> {
            self.focused
        }
    }

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-07T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn setup() -> (Coordinator<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::new(start());
        let coordinator = Coordinator::new(store.clone(), clock.clone(), TrackerConfig::default());
        (coordinator, store, clock)
    }

    fn activated(id: i64) -> BrowserEvent {
        BrowserEvent::TabActivated { tab_id: TabId(id) }
    }

    fn today_key(domain: &str) -> String {
        bucket::day_key(&Domain::new(domain).unwrap(), bucket::local_day(start()))
    }

    #[tokio::test]
    async fn switching_to_internal_page_flushes_and_goes_idle() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default()
            .with(1, "https://example.com/page")
            .with(2, "chrome://settings");

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::seconds(3));
        coordinator.handle_event(activated(2), &tabs).await;
        coordinator.settle().await;

        assert_eq!(coordinator.state(), &TrackingState::Idle);
        let entries = store.snapshot();
        assert_eq!(int_value(&entries, "example.com"), 3_000);
        assert_eq!(int_value(&entries, &today_key("example.com")), 3_000);
        assert_eq!(entries.len(), 2, "nothing attributed to the internal page");
    }

    #[tokio::test]
    async fn sub_second_intervals_are_discarded() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default()
            .with(1, "https://a.com")
            .with(2, "https://b.com");

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::milliseconds(999));
        coordinator.handle_event(activated(2), &tabs).await;
        clock.advance(Duration::milliseconds(1_000));
        coordinator.handle_event(activated(1), &tabs).await;
        coordinator.settle().await;

        let entries = store.snapshot();
        assert_eq!(int_value(&entries, "a.com"), 0);
        assert_eq!(int_value(&entries, "b.com"), 1_000);
    }

    #[tokio::test]
    async fn flushed_time_matches_active_intervals() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default()
            .with(1, "https://a.com")
            .with(2, "https://b.com")
            .with(3, "about:blank");

        let script: &[(i64, i64)] = &[(1, 4_000), (2, 2_500), (3, 7_000), (1, 500), (2, 1_200), (1, 6_000)];
        for &(tab, stay_ms) in script {
            coordinator.handle_event(activated(tab), &tabs).await;
            clock.advance(Duration::milliseconds(stay_ms));
        }
        coordinator.stop();
        coordinator.settle().await;

        let entries = store.snapshot();
        // a.com: 4000 + 6000 (500 dropped); b.com: 2500 + 1200
        assert_eq!(int_value(&entries, "a.com"), 10_000);
        assert_eq!(int_value(&entries, "b.com"), 3_700);
        assert_eq!(int_value(&entries, &today_key("a.com")), 10_000);
        let info = coordinator.debug_info();
        assert_eq!(info.flushed_ms, 13_700);
        // last session: the final 6s on a.com
        assert_eq!(info.session_flushed_ms, 6_000);
    }

    #[tokio::test]
    async fn window_blur_stops_and_refocus_resumes_focused_tab() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default().with(1, "https://a.com").focused(1);

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::seconds(2));
        coordinator
            .handle_event(BrowserEvent::WindowFocusChanged { window_id: None }, &tabs)
            .await;
        assert_eq!(coordinator.state(), &TrackingState::Idle);

        clock.advance(Duration::seconds(60));
        coordinator
            .handle_event(BrowserEvent::WindowFocusChanged { window_id: Some(7) }, &tabs)
            .await;
        assert!(matches!(coordinator.state(), TrackingState::Tracking { tab_id: TabId(1), .. }));

        clock.advance(Duration::seconds(5));
        coordinator.stop();
        coordinator.settle().await;

        assert_eq!(int_value(&store.snapshot(), "a.com"), 7_000);
    }

    #[tokio::test]
    async fn only_completed_updates_of_active_tab_switch() {
        let (mut coordinator, _store, _clock) = setup();
        let tabs = FakeTabs::default().with(1, "https://a.com");

        for (complete, active) in [(false, true), (true, false)] {
            coordinator
                .handle_event(
                    BrowserEvent::TabUpdated {
                        tab_id: TabId(1),
                        complete,
                        active,
                    },
                    &tabs,
                )
                .await;
            assert_eq!(coordinator.state(), &TrackingState::Idle);
        }

        coordinator
            .handle_event(
                BrowserEvent::TabUpdated {
                    tab_id: TabId(1),
                    complete: true,
                    active: true,
                },
                &tabs,
            )
            .await;
        assert!(matches!(coordinator.state(), TrackingState::Tracking { .. }));
    }

    #[tokio::test]
    async fn unknown_tab_goes_idle() {
        let (mut coordinator, _store, _clock) = setup();
        let tabs = FakeTabs::default().with(1, "https://a.com");

        coordinator.handle_event(activated(1), &tabs).await;
        coordinator.handle_event(activated(99), &tabs).await;
        assert_eq!(coordinator.state(), &TrackingState::Idle);
    }

    #[tokio::test]
    async fn failed_flush_does_not_double_count_later() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default()
            .with(1, "https://a.com")
            .with(2, "https://a.com/other");

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::seconds(4));
        store.set_unavailable(true);
        coordinator.handle_event(activated(2), &tabs).await;
        coordinator.settle().await;
        store.set_unavailable(false);

        clock.advance(Duration::seconds(2));
        coordinator.stop();
        coordinator.settle().await;

        assert_eq!(int_value(&store.snapshot(), "a.com"), 2_000);
        assert_eq!(coordinator.debug_info().flushed_ms, 2_000);
    }

    #[tokio::test]
    async fn checkpoint_flushes_and_keeps_tracking() {
        let (mut coordinator, store, clock) = setup();
        let tabs = FakeTabs::default().with(1, "https://a.com");

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::seconds(3));
        coordinator.checkpoint();
        coordinator.settle().await;
        assert_eq!(int_value(&store.snapshot(), "a.com"), 3_000);

        let TrackingState::Tracking { since, .. } = coordinator.state() else {
            panic!("still tracking after checkpoint");
        };
        assert_eq!(*since, start() + Duration::seconds(3));
    }

    #[tokio::test]
    async fn session_counter_restarts_with_each_tracked_tab() {
        let (mut coordinator, _store, clock) = setup();
        let tabs = FakeTabs::default()
            .with(1, "https://a.com")
            .with(2, "https://b.com");

        coordinator.handle_event(activated(1), &tabs).await;
        clock.advance(Duration::seconds(3));
        coordinator.checkpoint();
        clock.advance(Duration::seconds(2));
        coordinator.checkpoint();
        coordinator.settle().await;
        assert_eq!(coordinator.debug_info().session_flushed_ms, 5_000);

        coordinator.handle_event(activated(2), &tabs).await;
        coordinator.settle().await;
        let info = coordinator.debug_info();
        assert_eq!(info.session_flushed_ms, 0);
        assert_eq!(info.flushed_ms, 5_000);

        clock.advance(Duration::seconds(4));
        coordinator.checkpoint();
        coordinator.settle().await;
        let info = coordinator.debug_info();
        assert_eq!(info.session_flushed_ms, 4_000);
        assert_eq!(info.flushed_ms, 9_000);
    }

    #[tokio::test]
    async fn increment_time_rejects_invalid_input_without_touching_store() {
        let (mut coordinator, store, _clock) = setup();

        for request in [
            Request::IncrementTime {
                domain: String::new(),
                time_spent: 5_000,
            },
            Request::IncrementTime {
                domain: "a.com".to_string(),
                time_spent: 0,
            },
            Request::IncrementTime {
                domain: "a.com".to_string(),
                time_spent: -10,
            },
        ] {
            assert_eq!(coordinator.handle_request(request).await, Response::failed());
        }
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn increment_time_adds_to_both_buckets() {
        let (mut coordinator, store, _clock) = setup();
        let request = Request::IncrementTime {
            domain: "a.com".to_string(),
            time_spent: 10_000,
        };

        assert!(coordinator.handle_request(request.clone()).await.is_success());
        assert!(coordinator.handle_request(request).await.is_success());

        let entries = store.snapshot();
        assert_eq!(int_value(&entries, "a.com"), 20_000);
        assert_eq!(int_value(&entries, &today_key("a.com")), 20_000);
    }

    #[tokio::test]
    async fn increment_time_reports_store_failure() {
        let (mut coordinator, store, _clock) = setup();
        store.set_unavailable(true);
        let response = coordinator
            .handle_request(Request::IncrementTime {
                domain: "a.com".to_string(),
                time_spent: 1_000,
            })
            .await;
        assert_eq!(response, Response::failed());
    }

    #[tokio::test]
    async fn time_and_today_queries_split_the_key_space() {
        let (mut coordinator, store, _clock) = setup();
        store
            .set(Entries::from([
                ("a.com".to_string(), Value::from(50_000)),
                (today_key("a.com"), Value::from(20_000)),
                ("a.com_today_1999-01-01".to_string(), Value::from(30_000)),
                ("timerEnabled".to_string(), Value::Bool(true)),
            ]))
            .await
            .unwrap();

        let all = coordinator.handle_request(Request::GetTimeData).await;
        assert_eq!(
            all,
            Response::Totals(BTreeMap::from([("a.com".to_string(), 50_000)]))
        );

        let today = coordinator.handle_request(Request::GetTodayData).await;
        assert_eq!(
            today,
            Response::Totals(BTreeMap::from([("a.com".to_string(), 20_000)]))
        );
    }

    #[tokio::test]
    async fn queries_return_empty_mapping_when_store_fails() {
        let (mut coordinator, store, _clock) = setup();
        store.set_unavailable(true);
        for request in [Request::GetTimeData, Request::GetTodayData] {
            assert_eq!(
                coordinator.handle_request(request).await,
                Response::Totals(BTreeMap::new())
            );
        }
    }

    #[tokio::test]
    async fn clear_data_wipes_everything_including_flag() {
        let (mut coordinator, store, _clock) = setup();
        coordinator
            .handle_request(Request::ToggleTimer { enabled: false })
            .await;
        coordinator
            .handle_request(Request::IncrementTime {
                domain: "a.com".to_string(),
                time_spent: 5_000,
            })
            .await;

        assert!(coordinator.handle_request(Request::ClearData).await.is_success());
        assert!(store.snapshot().is_empty());
        assert_eq!(
            coordinator.handle_request(Request::GetTimeData).await,
            Response::Totals(BTreeMap::new())
        );
        assert_eq!(
            coordinator.handle_request(Request::GetTodayData).await,
            Response::Totals(BTreeMap::new())
        );
        assert!(coordinator.timer_enabled().await, "flag falls back to shown");
    }

    #[tokio::test]
    async fn clear_data_reports_failure() {
        let (mut coordinator, store, _clock) = setup();
        store.set_unavailable(true);
        assert_eq!(
            coordinator.handle_request(Request::ClearData).await,
            Response::failed()
        );
    }

    #[tokio::test]
    async fn toggle_timer_persists_flag() {
        let (mut coordinator, _store, _clock) = setup();
        assert!(coordinator.timer_enabled().await);

        assert!(coordinator
            .handle_request(Request::ToggleTimer { enabled: false })
            .await
            .is_success());
        assert!(!coordinator.timer_enabled().await);
    }

    #[tokio::test]
    async fn advisory_baselines_only_feed_debug_info() {
        let (mut coordinator, store, _clock) = setup();

        let response = coordinator
            .handle_request(Request::TimerStarted {
                domain: "a.com".to_string(),
                timestamp: 1_700_000_000_000,
            })
            .await;
        assert!(response.is_success());
        coordinator
            .handle_request(Request::TimerResumed {
                domain: "a.com".to_string(),
                timestamp: 1_700_000_005_000,
            })
            .await;

        assert!(store.snapshot().is_empty());
        let Response::Debug(info) = coordinator.handle_request(Request::GetDebugInfo).await else {
            panic!("expected debug info");
        };
        assert!(!info.tracking_active);
        assert_eq!(
            info.page_baseline,
            Some(PageBaseline {
                domain: "a.com".to_string(),
                timestamp: 1_700_000_005_000,
                resumed: true,
            })
        );
    }

    #[tokio::test]
    async fn debug_info_reports_current_session() {
        let (mut coordinator, _store, _clock) = setup();
        let tabs = FakeTabs::default().with(4, "https://a.com/x");
        coordinator.handle_event(activated(4), &tabs).await;

        let info = coordinator.debug_info();
        assert!(info.tracking_active);
        assert_eq!(info.current_tab_id, Some(TabId(4)));
        assert_eq!(info.current_domain, Some(Domain::new("a.com").unwrap()));
        assert_eq!(info.tracking_since, Some(start()));
    }
}
