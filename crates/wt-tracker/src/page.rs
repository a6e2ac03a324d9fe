//! Per-page session timer.
//!
//! One [`PageTimer`] runs inside each page. It keeps a local clock for the
//! page's domain, pauses while the page is hidden or blurred, and reports
//! elapsed deltas to the coordinator with `incrementTime`. It never writes
//! the store itself.
//!
//! # Clock Model
//!
//! While active, elapsed time is `now - session_started_at`. Pausing freezes
//! the display at `last_flushed_elapsed_ms`; resuming rebases
//! `session_started_at` so the counter continues from that value.
//!
//! # Host Context
//!
//! Every entry point first asks the [`Messenger`] whether the background is
//! still reachable. Once it is not (extension reloaded or disabled), the
//! timer only cleans up locally.

use chrono::{DateTime, Duration, Utc};
use wt_core::{
    Domain, PageRequest, Request, Response, TimerSnapshot, TrackerConfig, format_elapsed,
    trackable_domain,
};

use crate::widget::Widget;

/// Fire-and-forget channel from a page to the background coordinator.
pub trait Messenger: Send {
    /// Whether the background context can still be reached.
    fn is_connected(&self) -> bool;

    /// Sends a request without waiting for the response.
    fn send(&self, request: Request);
}

/// Lifecycle phase of a page timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    /// Waiting for the page to settle.
    Uninitialized,
    /// The page is not trackable; the timer does nothing for its lifetime.
    Inert,
    Active,
    Paused,
    /// Torn down or detached from the host.
    Stopped,
}

/// Whether periodic work should continue after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Live,
    /// The host context is gone; periodic work must stop.
    Detached,
}

/// Session timer for a single page instance.
pub struct PageTimer<M, W> {
    config: TrackerConfig,
    messenger: M,
    widget: W,
    phase: PagePhase,
    domain: Option<Domain>,
    session_started_at: Option<DateTime<Utc>>,
    last_flushed_elapsed_ms: i64,
    enabled: bool,
}

impl<M: Messenger, W: Widget> PageTimer<M, W> {
    pub const fn new(messenger: M, widget: W, config: TrackerConfig) -> Self {
        Self {
            config,
            messenger,
            widget,
            phase: PagePhase::Uninitialized,
            domain: None,
            session_started_at: None,
            last_flushed_elapsed_ms: 0,
            enabled: true,
        }
    }

    pub const fn phase(&self) -> PagePhase {
        self.phase
    }

    pub const fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    /// Whether the timer is counting or paused (and so needs periodic ticks).
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, PagePhase::Active | PagePhase::Paused)
    }

    /// Starts the session once the page has settled.
    ///
    /// Non-trackable pages make the timer inert. A hidden page starts paused.
    pub fn start(&mut self, url: &str, hidden: bool, enabled: bool, now: DateTime<Utc>) {
        if self.phase != PagePhase::Uninitialized {
            return;
        }
        self.enabled = enabled;
        let Some(domain) = trackable_domain(url) else {
            tracing::debug!(url, "page not trackable");
            self.phase = PagePhase::Inert;
            return;
        };

        self.widget.mount(enabled);
        self.widget.set_paused(hidden);
        self.session_started_at = Some(now);
        self.last_flushed_elapsed_ms = 0;
        self.phase = if hidden {
            PagePhase::Paused
        } else {
            PagePhase::Active
        };
        tracing::debug!(%domain, phase = ?self.phase, "page timer started");

        self.send(Request::TimerStarted {
            domain: domain.to_string(),
            timestamp: now.timestamp_millis(),
        });
        self.domain = Some(domain);
    }

    /// Elapsed active milliseconds as displayed.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        match (self.phase, self.session_started_at) {
            (PagePhase::Active, Some(started)) => (now - started).num_milliseconds(),
            (PagePhase::Paused, _) => self.last_flushed_elapsed_ms,
            _ => 0,
        }
    }

    /// Display refresh: renders the elapsed time and applies the enable flag.
    pub fn tick_display(&mut self, now: DateTime<Utc>) -> Liveness {
        if !self.messenger.is_connected() {
            self.detach();
            return Liveness::Detached;
        }
        if self.is_running() {
            self.widget.render(&format_elapsed(self.elapsed_ms(now)));
            self.widget.set_visible(self.enabled);
        }
        Liveness::Live
    }

    /// Periodic flush: reports unflushed time once it reaches the threshold.
    pub fn tick_flush(&mut self, now: DateTime<Utc>) -> Liveness {
        if !self.messenger.is_connected() {
            self.detach();
            return Liveness::Detached;
        }
        if self.phase == PagePhase::Active {
            let elapsed = self.elapsed_ms(now);
            let unflushed = elapsed - self.last_flushed_elapsed_ms;
            if unflushed >= self.config.flush_threshold_ms {
                self.report(unflushed);
                self.last_flushed_elapsed_ms = elapsed;
            }
        }
        Liveness::Live
    }

    /// Handles a page visibility change.
    pub fn on_visibility_change(&mut self, hidden: bool, now: DateTime<Utc>) {
        if hidden {
            self.pause(now);
        } else {
            self.resume(now);
        }
    }

    /// Handles the window gaining focus; a still-hidden page stays paused.
    pub fn on_focus(&mut self, hidden: bool, now: DateTime<Utc>) {
        if !hidden {
            self.resume(now);
        }
    }

    /// Handles the window losing focus.
    pub fn on_blur(&mut self, now: DateTime<Utc>) {
        self.pause(now);
    }

    /// Active → Paused, flushing unflushed time above the noise floor.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.messenger.is_connected() || self.phase != PagePhase::Active {
            return;
        }
        let elapsed = self.elapsed_ms(now);
        let unflushed = elapsed - self.last_flushed_elapsed_ms;
        if unflushed > self.config.min_flush_ms {
            self.report(unflushed);
            self.last_flushed_elapsed_ms = elapsed;
        }

        self.phase = PagePhase::Paused;
        self.widget.set_paused(true);
        self.widget
            .render(&format_elapsed(self.last_flushed_elapsed_ms));
        tracing::debug!(frozen_ms = self.last_flushed_elapsed_ms, "page timer paused");
    }

    /// Paused → Active, continuing the counter from its frozen value.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.messenger.is_connected() || self.phase != PagePhase::Paused {
            return;
        }
        let started = now - Duration::milliseconds(self.last_flushed_elapsed_ms);
        self.session_started_at = Some(started);
        self.phase = PagePhase::Active;
        self.widget.set_paused(false);
        tracing::debug!(resumed_at_ms = self.last_flushed_elapsed_ms, "page timer resumed");

        if let Some(domain) = &self.domain {
            let request = Request::TimerResumed {
                domain: domain.to_string(),
                timestamp: started.timestamp_millis(),
            };
            self.send(request);
        }
    }

    /// Page unload: final flush, then remove the widget.
    pub fn teardown(&mut self, now: DateTime<Utc>) {
        if !self.messenger.is_connected() {
            self.detach();
            return;
        }
        if self.is_running() {
            let unflushed = self.elapsed_ms(now) - self.last_flushed_elapsed_ms;
            if unflushed > self.config.min_flush_ms {
                self.report(unflushed);
            }
        }
        self.widget.remove();
        self.phase = PagePhase::Stopped;
        self.session_started_at = None;
        self.last_flushed_elapsed_ms = 0;
    }

    /// Local-only cleanup once the host context is gone.
    fn detach(&mut self) {
        if self.phase != PagePhase::Stopped {
            tracing::debug!("host context gone, detaching page timer");
        }
        self.widget.remove();
        self.phase = PagePhase::Stopped;
    }

    /// Answers a message addressed to this page.
    pub fn handle_message(&mut self, request: &PageRequest, now: DateTime<Utc>) -> Response {
        match request {
            PageRequest::ToggleTimer { enabled } => {
                self.enabled = *enabled;
                self.widget.set_visible(*enabled);
                Response::ok()
            }
            PageRequest::GetTimerState => Response::TimerState(self.snapshot(now)),
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            is_active: self.is_running(),
            is_paused: self.phase == PagePhase::Paused,
            domain: self.domain.clone(),
            start_time: self.session_started_at,
            elapsed_ms: self.elapsed_ms(now),
            enabled: self.enabled,
        }
    }

    fn report(&self, time_spent: i64) {
        if let Some(domain) = &self.domain {
            self.send(Request::IncrementTime {
                domain: domain.to_string(),
                time_spent,
            });
        }
    }

    fn send(&self, request: Request) {
        if self.messenger.is_connected() {
            self.messenger.send(request);
        }
    }
}
