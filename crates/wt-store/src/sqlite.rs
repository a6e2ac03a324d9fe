//! SQLite-backed store.
//!
//! # Thread Safety
//!
//! `rusqlite::Connection` is `Send` but not `Sync`, so the connection lives
//! behind a `Mutex` and every operation holds the lock for one short
//! statement or transaction. Clones share the connection.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::{Entries, Store, StoreError};

/// A [`Store`] persisted in a SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens a store at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory store.
    ///
    /// Useful for testing. The data is destroyed when the last clone is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Initializes the schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            -- kv: one row per store key
            -- value: JSON text (integer milliseconds or the boolean enable flag)
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".into()))
    }
}

fn decode(key: String, raw: &str) -> Result<(String, Value), StoreError> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok((key, value)),
        Err(source) => Err(StoreError::Encoding { key, source }),
    }
}

impl Store for SqliteStore {
    async fn get(&self, keys: &[String]) -> Result<Entries, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let mut entries = Entries::new();
        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()?;
            if let Some(raw) = raw {
                let (key, value) = decode(key.clone(), &raw)?;
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }

    async fn get_all(&self) -> Result<Entries, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT key, value FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Entries::new();
        for row in rows {
            let (key, raw) = row?;
            let (key, value) = decode(key, &raw)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    async fn set(&self, entries: Entries) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            for (key, value) in &entries {
                let raw = serde_json::to_string(value).map_err(|source| StoreError::Encoding {
                    key: key.clone(),
                    source,
                })?;
                stmt.execute(params![key, raw])?;
            }
        }
        tx.commit()?;
        tracing::trace!(count = entries.len(), "stored entries");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM kv", [])?;
        tracing::debug!(removed, "cleared store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::int_value;

    #[tokio::test]
    async fn values_roundtrip_with_their_json_type() {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        store
            .set(Entries::from([
                ("example.com".to_string(), json!(12_000)),
                ("timerEnabled".to_string(), json!(false)),
            ]))
            .await
            .unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.get("example.com"), Some(&json!(12_000)));
        assert_eq!(all.get("timerEnabled"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn set_overwrites_existing_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set(Entries::from([("a.com".to_string(), json!(1))]))
            .await
            .unwrap();
        store
            .set(Entries::from([("a.com".to_string(), json!(2))]))
            .await
            .unwrap();

        let got = store.get(&["a.com".to_string()]).await.unwrap();
        assert_eq!(int_value(&got, "a.com"), 2);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set(Entries::from([
                ("a.com".to_string(), json!(1)),
                ("a.com_today_2025-01-01".to_string(), json!(1)),
                ("timerEnabled".to_string(), json!(true)),
            ]))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn data_persists_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wt.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .set(Entries::from([("a.com".to_string(), json!(42))]))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let got = store.get(&["a.com".to_string()]).await.unwrap();
        assert_eq!(int_value(&got, "a.com"), 42);
    }
}
