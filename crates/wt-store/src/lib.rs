//! Durable key-value storage for the time tracker.
//!
//! The tracker only needs a small map-like store: get selected keys, get
//! everything, write a batch of keys, clear everything. [`Store`] captures
//! that boundary; every operation is asynchronous and may fail.
//!
//! Two implementations are provided:
//! - [`SqliteStore`] persists to a `rusqlite` database.
//! - [`MemoryStore`] keeps values in memory and can be switched into a
//!   failing mode to exercise error paths.
//!
//! # Value Encoding
//!
//! Values are `serde_json::Value`s. Time totals are integers (milliseconds),
//! the widget flag is a boolean. The SQLite store keeps each value as JSON
//! text so both kinds round-trip exactly.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use thiserror::Error;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value could not be encoded or decoded.
    #[error("invalid stored value for {key}: {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A snapshot of stored entries.
pub type Entries = HashMap<String, Value>;

/// An asynchronous key-value store.
///
/// Implementations are cheap to clone; clones address the same underlying data.
pub trait Store: Clone + Send + Sync + 'static {
    /// Reads the given keys. Missing keys are absent from the result.
    fn get(&self, keys: &[String]) -> impl Future<Output = Result<Entries, StoreError>> + Send;

    /// Reads every entry.
    fn get_all(&self) -> impl Future<Output = Result<Entries, StoreError>> + Send;

    /// Writes all entries as one update.
    fn set(&self, entries: Entries) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes every entry.
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Reads an integer value, treating missing or non-integer values as zero.
pub fn int_value(entries: &Entries, key: &str) -> i64 {
    entries.get(key).and_then(Value::as_i64).unwrap_or(0)
}
