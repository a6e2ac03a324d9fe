//! Active-time accounting for the web time tracker.
//!
//! Two cooperating state machines:
//! - [`Coordinator`]: background owner of "which domain is active"; reacts to
//!   tab and window events and is the single writer of totals.
//! - [`PageTimer`]: per-page countup clock that pauses with visibility and
//!   focus and reports deltas to the coordinator.
//!
//! [`runtime`] wires both into tokio event loops connected by channels.

mod coordinator;
pub mod ledger;
mod page;
pub mod runtime;
mod widget;

pub use coordinator::{BrowserEvent, Coordinator, TabSource, TrackingState};
pub use ledger::accrue;
pub use page::{Liveness, Messenger, PagePhase, PageTimer};
pub use runtime::{
    BackgroundHandle, ChannelMessenger, PageEvent, PageHub, PageLoad, RuntimeClock,
    background_channel, run_background, run_page, toggle_timer,
};
pub use widget::{HeadlessWidget, Widget, WidgetView};
