//! Web time tracker CLI library.
//!
//! Inspects and maintains the per-domain totals written by the tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, Switch};
pub use config::Config;
