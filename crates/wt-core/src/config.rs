//! Timing parameters shared by the coordinator and page timers.

use serde::{Deserialize, Serialize};

/// Timing configuration for active-time accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Delay between page load and timer start, so transient navigations are not counted.
    /// Default: 1000 (1 second).
    pub settle_delay_ms: i64,

    /// Period of the widget display refresh.
    /// Default: 1000 (1 second).
    pub display_tick_ms: i64,

    /// Period of the page's periodic flush check.
    /// Default: 10000 (10 seconds).
    pub flush_interval_ms: i64,

    /// Unflushed time a periodic flush needs before it reports anything.
    /// Default: 5000 (5 seconds).
    pub flush_threshold_ms: i64,

    /// Shortest interval worth storing; anything below is dropped as noise.
    /// Default: 1000 (1 second).
    pub min_flush_ms: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1_000,
            display_tick_ms: 1_000,
            flush_interval_ms: 10_000,
            flush_threshold_ms: 5_000,
            min_flush_ms: 1_000,
        }
    }
}
