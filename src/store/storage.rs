//! Store trait and its SQLite and in-memory implementations.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

/// Durable string key/value mapping.
///
/// Failures never reach the caller: a failed read is a miss and a failed
/// write is dropped. Callers treat absence as the normal "nothing cached yet"
/// condition.
pub trait Store: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;

  fn set(&self, key: &str, value: &str);

  fn remove(&self, key: &str);
}

/// Store kept in process memory. Used for ephemeral runs and tests.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Store for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().ok()?.get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.insert(key.to_string(), value.to_string());
    }
  }

  fn remove(&self, key: &str) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.remove(key);
    }
  }
}

/// SQLite-backed store surviving process restarts.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open (or create) the store at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create store directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open store at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run store migrations: {}", e))?;

    Ok(())
  }

  fn try_get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
        row.get(0)
      })
      .optional()
      .map_err(|e| eyre!("Failed to read {}: {}", key, e))
  }

  fn try_set(&self, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write {}: {}", key, e))?;

    Ok(())
  }

  fn try_remove(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute("DELETE FROM kv WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to remove {}: {}", key, e))?;

    Ok(())
  }
}

const STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl Store for SqliteStore {
  fn get(&self, key: &str) -> Option<String> {
    match self.try_get(key) {
      Ok(value) => value,
      Err(e) => {
        warn!(key, error = %e, "store read failed, treating as missing");
        None
      }
    }
  }

  fn set(&self, key: &str, value: &str) {
    if let Err(e) = self.try_set(key, value) {
      warn!(key, error = %e, "store write dropped");
    }
  }

  fn remove(&self, key: &str) {
    if let Err(e) = self.try_remove(key) {
      warn!(key, error = %e, "store remove failed");
    }
  }
}
