//! CLI subcommand implementations.

pub mod clear;
pub mod replay;
pub mod report;
pub mod status;
pub mod toggle;
