//! SQLite-backed store.
//!
//! Slots live in a single `options` table. Values are stored JSON-encoded
//! so integers, strings and maps round-trip without a column per type.

use crate::error::StoreResult;
use crate::KeyValueStore;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS options (
    option_name  TEXT PRIMARY KEY,
    option_value TEXT NOT NULL,
    autoload     INTEGER NOT NULL DEFAULT 1
);
";

/// A [`KeyValueStore`] persisted in a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "Opening settings database");
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Returns every slot flagged for autoload, ordered by name.
    pub fn autoloaded(&self) -> StoreResult<Vec<(String, Value)>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT option_name, option_value FROM options WHERE autoload = 1 ORDER BY option_name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (name, raw) = row?;
            out.push((name, serde_json::from_str(&raw)?));
        }
        Ok(out)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let raw: Option<String> = conn
            .query_row(
                "SELECT option_value FROM options WHERE option_name = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, autoload: bool) -> StoreResult<()> {
        let raw = serde_json::to_string(&value)?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO options (option_name, option_value, autoload) VALUES (?1, ?2, ?3)
             ON CONFLICT(option_name) DO UPDATE SET
                option_value = excluded.option_value,
                autoload = excluded.autoload",
            params![key, raw, autoload],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute("DELETE FROM options WHERE option_name = ?1", params![key])?;
        Ok(())
    }
}
