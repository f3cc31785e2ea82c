//! Persistence collaborators
//!
//! The version store talks to an injected key-value interface rather than a
//! process-wide store, so any backend can stand in and tests run against an
//! in-memory fake. The shipped backend is a small SQLite key/value table.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use rusqlite::{params, Connection};

/// Key-value persistence used by the version store
pub trait Persistence: Send {
    /// Get a stored value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory persistence for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed persistence
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode avoids lock contention when a second shell instance
        // touches the same project
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(Self { conn })
    }
}

impl Persistence for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = strftime('%s', 'now')",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let mut store = SqliteStore::open(&path).unwrap();
        store.set("history", "[1,2,3]").unwrap();
        store.set("history", "[4]").unwrap();
        assert_eq!(store.get("history"), Some("[4]".to_string()));
        drop(store);

        // Survives reopen
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("history"), Some("[4]".to_string()));
        assert_eq!(store.get("missing"), None);
    }
}
