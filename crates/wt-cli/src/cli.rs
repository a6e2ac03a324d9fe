//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Per-domain browsing time tracker.
///
/// Inspects and maintains the totals recorded by the browser tracker.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show store location, widget flag and tracked domain count.
    Status,

    /// Show time per domain.
    Report {
        /// Only today's time (local calendar day).
        #[arg(long)]
        today: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Hide sites with less time than this many seconds.
        #[arg(long, value_name = "SECS", default_value_t = crate::commands::report::DEFAULT_MIN_SECS)]
        min: u64,
    },

    /// Delete all recorded time, day buckets and the widget flag.
    Clear,

    /// Show or hide the on-page timer widget.
    Toggle {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Replay a JSONL log of browser tab/window events into the store.
    Replay {
        /// Path to the event log.
        path: PathBuf,
    },
}

/// Widget visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}
