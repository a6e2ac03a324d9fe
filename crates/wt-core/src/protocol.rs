//! Message protocol between page timers, the popup and the background coordinator.
//!
//! Requests are JSON objects discriminated by an `action` field, e.g.
//! `{"action":"incrementTime","domain":"example.com","timeSpent":5000}`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Domain, TabId};

/// A request handled by the background coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Lifetime milliseconds per domain.
    GetTimeData,
    /// Milliseconds per domain for the current local day.
    GetTodayData,
    /// Wipe the whole store.
    ClearData,
    /// Add a page-reported delta to a domain's totals.
    IncrementTime {
        domain: String,
        #[serde(rename = "timeSpent")]
        time_spent: i64,
    },
    /// A page timer started its local clock.
    TimerStarted { domain: String, timestamp: i64 },
    /// A page timer resumed its local clock.
    TimerResumed { domain: String, timestamp: i64 },
    /// Snapshot of the coordinator's tracking state.
    GetDebugInfo,
    /// Persist the widget enable flag.
    ToggleTimer { enabled: bool },
}

impl Request {
    /// The wire name of the request's action.
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GetTimeData => "getTimeData",
            Self::GetTodayData => "getTodayData",
            Self::ClearData => "clearData",
            Self::IncrementTime { .. } => "incrementTime",
            Self::TimerStarted { .. } => "timerStarted",
            Self::TimerResumed { .. } => "timerResumed",
            Self::GetDebugInfo => "getDebugInfo",
            Self::ToggleTimer { .. } => "toggleTimer",
        }
    }
}

/// A request delivered to a single page timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    /// Show or hide the widget.
    ToggleTimer { enabled: bool },
    /// Snapshot of the page timer.
    GetTimerState,
}

/// The last clock baseline a page timer announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBaseline {
    pub domain: String,
    pub timestamp: i64,
    pub resumed: bool,
}

/// Coordinator state for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub tracking_active: bool,
    pub current_tab_id: Option<TabId>,
    pub current_domain: Option<Domain>,
    pub tracking_since: Option<DateTime<Utc>>,
    /// Milliseconds written successfully since the coordinator started.
    pub flushed_ms: i64,
    /// Milliseconds written successfully for the current (or most recent)
    /// tracking session.
    pub session_flushed_ms: i64,
    pub page_baseline: Option<PageBaseline>,
}

/// Page timer state for diagnostics and the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub is_active: bool,
    pub is_paused: bool,
    pub domain: Option<Domain>,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "elapsed")]
    pub elapsed_ms: i64,
    pub enabled: bool,
}

/// A response to a [`Request`] or [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack { success: bool },
    Debug(DebugInfo),
    TimerState(TimerSnapshot),
    Totals(BTreeMap<String, i64>),
}

impl Response {
    pub const fn ok() -> Self {
        Self::Ack { success: true }
    }

    pub const fn failed() -> Self {
        Self::Ack { success: false }
    }

    /// Whether the response is a successful acknowledgement.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ack { success: true })
    }

    /// The totals carried by the response, if any.
    pub fn into_totals(self) -> Option<BTreeMap<String, i64>> {
        match self {
            Self::Totals(totals) => Some(totals),
            _ => None,
        }
    }
}
