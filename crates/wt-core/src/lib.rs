//! Core domain logic for the web time tracker.
//!
//! This crate contains the pieces shared by the background coordinator and
//! the page timers:
//! - Validated domain and tab types
//! - The trackable-URL predicate and hostname extraction
//! - The store key scheme (lifetime totals, day buckets, enable flag)
//! - Elapsed-time formatting
//! - The message protocol

pub mod bucket;
pub mod clock;
mod config;
pub mod format;
pub mod protocol;
pub mod site;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use format::{format_duration, format_elapsed};
pub use protocol::{DebugInfo, PageBaseline, PageRequest, Request, Response, TimerSnapshot};
pub use site::{domain_from_url, is_trackable_url, trackable_domain};
pub use types::{DeltaMs, Domain, TabId, ValidationError};
