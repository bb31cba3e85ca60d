//! Key/value document store contracts and implementations.
//!
//! # Responsibility
//! - Provide `read`/`write` of one string value per key.
//! - Keep SQLite access behind the `DocumentStore` trait.
//!
//! # Invariants
//! - `SqliteDocumentStore` only wraps connections migrated to the latest
//!   schema version.
//! - `write` replaces the whole value for the key.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, table_exists, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by a durable store backend.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection is not migrated to the schema this build expects.
    SchemaMismatch {
        expected_version: u32,
        actual_version: u32,
    },
    MissingTable(&'static str),
    /// Document could not be serialized.
    Encode(serde_json::Error),
    /// Backend refused the operation.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaMismatch {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store schema version mismatch: expected {expected_version}, got {actual_version}"
            ),
            Self::MissingTable(table) => write!(f, "required table `{table}` is missing"),
            Self::Encode(err) => write!(f, "failed to encode document: {err}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::SchemaMismatch { .. } | Self::MissingTable(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key/value storage for serialized documents.
pub trait DocumentStore {
    /// Reads the value stored under `key`, `None` when absent.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }
}

/// SQLite-backed store over the `kv_store` table.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `SchemaMismatch` when `user_version` is not the latest migration.
    /// - `MissingTable` when `kv_store` does not exist.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn ensure_store_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::SchemaMismatch {
            expected_version,
            actual_version,
        });
    }
    if !table_exists(conn, "kv_store")? {
        return Err(StoreError::MissingTable("kv_store"));
    }
    Ok(())
}

/// In-process store with failure switches, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `value` under `key`.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.into());
        store
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Current raw value under `key`, bypassing failure switches.
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.value(key))
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, MemoryStore, SqliteDocumentStore, StoreError};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn sqlite_store_upserts_by_key() {
        let conn = open_db_in_memory().expect("in-memory db should open");
        let store = SqliteDocumentStore::try_new(&conn).expect("store should accept migrated db");

        assert_eq!(store.read("k").expect("read should succeed"), None);
        store.write("k", "one").expect("first write should succeed");
        store.write("k", "two").expect("second write should succeed");
        assert_eq!(
            store.read("k").expect("read should succeed").as_deref(),
            Some("two")
        );
    }

    #[test]
    fn sqlite_store_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().expect("raw connection should open");
        let error = SqliteDocumentStore::try_new(&conn)
            .err()
            .expect("unmigrated connection must be rejected");
        assert!(matches!(error, StoreError::SchemaMismatch { actual_version: 0, .. }));
    }

    #[test]
    fn memory_store_failure_switches() {
        let store = MemoryStore::with_value("k", "v");
        store.set_fail_reads(true);
        assert!(store.read("k").is_err());
        store.set_fail_writes(true);
        assert!(store.write("k", "w").is_err());
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.value("k").as_deref(), Some("v"));
    }
}
