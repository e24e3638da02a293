//! Durable key-value storage for the persisted script.
//!
//! The editor keeps exactly one JSON-serialized [`Script`] under one key.
//! [`SqliteStore`] is the on-disk backend; [`MemoryStore`] backs tests and
//! counts writes so autosave coalescing can be observed.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use manzai_types::Script;

/// Default key holding the persisted script.
pub const STORAGE_KEY: &str = "manzai-script";

/// Errors from a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value storage.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER DEFAULT (unixepoch())
);
"#;

/// SQLite-backed store: a single `kv` table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, mostly for tests.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, unixepoch())
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Load the persisted script, if there is a readable one.
///
/// Unparseable data is logged and treated as absent. A script that parses but
/// breaks the container invariants (blank title, repeated block ids) is
/// repaired with [`Script::normalized`].
pub fn load_script(store: &dyn KvStore, key: &str) -> StoreResult<Option<Script>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Script>(&raw) {
        Ok(script) if script.is_normalized() => Ok(Some(script)),
        Ok(script) => {
            tracing::warn!(key, script_id = %script.id, "repairing saved script");
            Ok(Some(script.normalized()))
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable saved script");
            Ok(None)
        }
    }
}

/// Persist `script` under `key`.
pub fn save_script(store: &dyn KvStore, key: &str, script: &Script) -> StoreResult<()> {
    let json = serde_json::to_string(script)?;
    store.set(key, &json)?;
    tracing::debug!(key, script_id = %script.id, bytes = json.len(), "script saved");
    Ok(())
}
