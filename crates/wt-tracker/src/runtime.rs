//! Event loops driving the coordinator and page timers.
//!
//! The background context and each page run their own loop. They share no
//! memory: pages reach the background through a [`BackgroundHandle`], and
//! the background reaches pages through a [`PageHub`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use wt_core::{Clock, PageRequest, Request, Response, TrackerConfig};
use wt_store::Store;

use crate::coordinator::{BrowserEvent, Coordinator, TabSource};
use crate::page::{Liveness, Messenger, PageTimer};
use crate::widget::Widget;

/// A clock that follows tokio's time, anchored to a wall-clock instant.
///
/// With tokio's paused test clock this advances only when tokio time does.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    wall_origin: DateTime<Utc>,
    origin: Instant,
}

impl RuntimeClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// A clock reading `wall` right now.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall_origin: wall,
            origin: Instant::now(),
        }
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RuntimeClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap_or_default();
        self.wall_origin + elapsed
    }
}

/// A request in flight to the background, with an optional reply slot.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: Option<oneshot::Sender<Response>>,
}

/// Sending side of the background context.
#[derive(Debug, Clone)]
pub struct BackgroundHandle {
    events: mpsc::UnboundedSender<BrowserEvent>,
    requests: mpsc::UnboundedSender<Envelope>,
}

/// Receiving side of the background context.
#[derive(Debug)]
pub struct BackgroundInbox {
    events: mpsc::UnboundedReceiver<BrowserEvent>,
    requests: mpsc::UnboundedReceiver<Envelope>,
}

/// Creates the channels connecting event sources and pages to the background loop.
pub fn background_channel() -> (BackgroundHandle, BackgroundInbox) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (requests_tx, requests_rx) = mpsc::unbounded_channel();
    (
        BackgroundHandle {
            events: events_tx,
            requests: requests_tx,
        },
        BackgroundInbox {
            events: events_rx,
            requests: requests_rx,
        },
    )
}

impl BackgroundHandle {
    /// Delivers a browser event. Returns `false` once the background is gone.
    pub fn dispatch(&self, event: BrowserEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Sends a request and waits for its response.
    ///
    /// Returns `None` when the background is gone.
    pub async fn request(&self, request: Request) -> Option<Response> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Envelope {
                request,
                reply: Some(reply),
            })
            .ok()?;
        response.await.ok()
    }

    /// A fire-and-forget messenger for a page timer.
    pub fn messenger(&self) -> ChannelMessenger {
        ChannelMessenger {
            requests: self.requests.clone(),
        }
    }
}

/// [`Messenger`] backed by the background request channel.
///
/// The host context counts as invalidated once the background loop has
/// dropped its receiver.
#[derive(Debug, Clone)]
pub struct ChannelMessenger {
    requests: mpsc::UnboundedSender<Envelope>,
}

impl Messenger for ChannelMessenger {
    fn is_connected(&self) -> bool {
        !self.requests.is_closed()
    }

    fn send(&self, request: Request) {
        let action = request.action();
        if self
            .requests
            .send(Envelope {
                request,
                reply: None,
            })
            .is_err()
        {
            tracing::debug!(action, "background gone, message dropped");
        }
    }
}

/// Runs the background loop until every handle is dropped.
///
/// The running session is checkpointed every `flush_interval_ms` so a crash
/// loses at most one interval. On exit the session is flushed and pending
/// writes are awaited.
pub async fn run_background<S, C, T>(
    mut coordinator: Coordinator<S, C>,
    tabs: T,
    mut inbox: BackgroundInbox,
) -> Coordinator<S, C>
where
    S: Store,
    C: Clock,
    T: TabSource,
{
    let every = period(coordinator.config().flush_interval_ms);
    let mut checkpoints = interval_at(Instant::now() + every, every);
    checkpoints.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let (mut events_open, mut requests_open) = (true, true);

    while events_open || requests_open {
        tokio::select! {
            event = inbox.events.recv(), if events_open => match event {
                Some(event) => coordinator.handle_event(event, &tabs).await,
                None => events_open = false,
            },
            envelope = inbox.requests.recv(), if requests_open => match envelope {
                Some(envelope) => {
                    let response = coordinator.handle_request(envelope.request).await;
                    if let Some(reply) = envelope.reply {
                        let _ = reply.send(response);
                    }
                }
                None => requests_open = false,
            },
            _ = checkpoints.tick() => coordinator.checkpoint(),
        }
    }
    tracing::debug!("background loop shutting down");
    coordinator.stop();
    coordinator.settle().await;
    coordinator
}

/// Notifications delivered to a page.
#[derive(Debug)]
pub enum PageEvent {
    VisibilityChanged {
        hidden: bool,
    },
    /// Window focus; carries the page's current hidden state.
    Focus {
        hidden: bool,
    },
    Blur,
    Unload,
    Message {
        request: PageRequest,
        reply: Option<oneshot::Sender<Response>>,
    },
}

/// How a page came up.
#[derive(Debug, Clone)]
pub struct PageLoad {
    pub url: String,
    pub hidden: bool,
    /// The widget enable flag as read at creation.
    pub enabled: bool,
}

/// Sending side of one page.
#[derive(Debug, Clone)]
pub struct PageHandle {
    events: mpsc::UnboundedSender<PageEvent>,
}

impl PageHandle {
    /// Delivers an event. Returns `false` once the page is gone.
    pub fn send(&self, event: PageEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Sends a message to the page and waits for its response.
    pub async fn request(&self, request: PageRequest) -> Option<Response> {
        let (reply, response) = oneshot::channel();
        let delivered = self.send(PageEvent::Message {
            request,
            reply: Some(reply),
        });
        if !delivered {
            return None;
        }
        response.await.ok()
    }
}

/// Registry of live pages, used to broadcast to all of them.
#[derive(Debug, Clone, Default)]
pub struct PageHub {
    pages: Arc<Mutex<Vec<PageHandle>>>,
}

impl PageHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new page and returns its handle and event receiver.
    pub fn open_page(&self) -> (PageHandle, mpsc::UnboundedReceiver<PageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = PageHandle {
            events: tx,
        };
        if let Ok(mut pages) = self.pages.lock() {
            pages.push(handle.clone());
        }
        (handle, rx)
    }

    /// Sends a message to every live page without waiting for replies.
    ///
    /// Pages whose loop has ended are dropped from the registry. Returns the
    /// number of pages reached.
    pub fn broadcast(&self, request: &PageRequest) -> usize {
        let Ok(mut pages) = self.pages.lock() else {
            return 0;
        };
        pages.retain(|page| {
            page.send(PageEvent::Message {
                request: request.clone(),
                reply: None,
            })
        });
        pages.len()
    }

    pub fn len(&self) -> usize {
        self.pages.lock().map(|pages| pages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persists the widget flag through the background and broadcasts it to every page.
///
/// Pages are told even if persisting fails. Returns whether the flag was stored.
pub async fn toggle_timer(background: &BackgroundHandle, hub: &PageHub, enabled: bool) -> bool {
    let stored = background
        .request(Request::ToggleTimer { enabled })
        .await
        .is_some_and(|response| response.is_success());
    let reached = hub.broadcast(&PageRequest::ToggleTimer { enabled });
    tracing::debug!(enabled, stored, reached, "broadcast timer toggle");
    stored
}

fn period(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0).max(1))
}

fn answer<M: Messenger, W: Widget>(
    timer: &mut PageTimer<M, W>,
    request: &PageRequest,
    reply: Option<oneshot::Sender<Response>>,
    now: DateTime<Utc>,
) {
    let response = timer.handle_message(request, now);
    if let Some(reply) = reply {
        let _ = reply.send(response);
    }
}

/// Runs one page's timer until the page unloads (or its handle is dropped).
///
/// The timer starts after the settle delay. Events arriving before that only
/// update the hidden state and the widget flag; an unload during the delay
/// ends the page without ever starting the timer.
pub async fn run_page<M, W, C>(
    mut timer: PageTimer<M, W>,
    load: PageLoad,
    config: &TrackerConfig,
    clock: C,
    mut events: mpsc::UnboundedReceiver<PageEvent>,
) -> PageTimer<M, W>
where
    M: Messenger,
    W: Widget,
    C: Clock,
{
    let settle = sleep(period(config.settle_delay_ms));
    tokio::pin!(settle);
    let mut hidden = load.hidden;
    let mut enabled = load.enabled;

    loop {
        tokio::select! {
            () = &mut settle => break,
            event = events.recv() => match event {
                Some(PageEvent::VisibilityChanged { hidden: now_hidden } | PageEvent::Focus { hidden: now_hidden }) => {
                    hidden = now_hidden;
                }
                Some(PageEvent::Blur) => {}
                Some(PageEvent::Message { request, reply }) => {
                    if let PageRequest::ToggleTimer { enabled: toggled } = &request {
                        enabled = *toggled;
                    }
                    answer(&mut timer, &request, reply, clock.now());
                }
                Some(PageEvent::Unload) | None => {
                    timer.teardown(clock.now());
                    return timer;
                }
            },
        }
    }

    timer.start(&load.url, hidden, enabled, clock.now());

    let display_period = period(config.display_tick_ms);
    let flush_period = period(config.flush_interval_ms);
    let mut display = interval_at(Instant::now() + display_period, display_period);
    let mut flush = interval_at(Instant::now() + flush_period, flush_period);
    display.set_missed_tick_behavior(MissedTickBehavior::Delay);
    flush.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticking = timer.is_running();

    loop {
        tokio::select! {
            _ = display.tick(), if ticking => {
                ticking = timer.tick_display(clock.now()) == Liveness::Live;
            }
            _ = flush.tick(), if ticking => {
                ticking = timer.tick_flush(clock.now()) == Liveness::Live;
            }
            event = events.recv() => {
                let now = clock.now();
                match event {
                    Some(PageEvent::VisibilityChanged { hidden }) => timer.on_visibility_change(hidden, now),
                    Some(PageEvent::Focus { hidden }) => timer.on_focus(hidden, now),
                    Some(PageEvent::Blur) => timer.on_blur(now),
                    Some(PageEvent::Message { request, reply }) => answer(&mut timer, &request, reply, now),
                    Some(PageEvent::Unload) | None => {
                        timer.teardown(now);
                        break;
                    }
                }
            }
        }
    }
    timer
}
