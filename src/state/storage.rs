use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::Result;

/// Persistent string key-value surface.
///
/// The session token and the theme preference live here between runs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// SQLite-backed key-value store.
/// One `kv` table, one row per key.
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!(path = %db_path.display(), "key-value store opened");

        let store = SqliteStore {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY NOT NULL,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    #[cfg(test)]
    /// Path to the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-process store, used when no database can be opened and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Either backend, so the app can fall back to memory without generics leaking
#[derive(Debug)]
pub enum AnyStore {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl KeyValueStore for AnyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::Sqlite(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Sqlite(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self {
            Self::Sqlite(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut impl KeyValueStore) {
        assert_eq!(store.get("medisetu_patientId").unwrap(), None);

        store.set("medisetu_patientId", "98765").unwrap();
        assert_eq!(store.get("medisetu_patientId").unwrap().as_deref(), Some("98765"));

        store.set("medisetu_patientId", "12345").unwrap();
        assert_eq!(store.get("medisetu_patientId").unwrap().as_deref(), Some("12345"));

        store.remove("medisetu_patientId").unwrap();
        assert_eq!(store.get("medisetu_patientId").unwrap(), None);

        // removing a missing key is fine
        store.remove("medisetu_patientId").unwrap();
    }

    #[test]
    fn test_sqlite_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(store.path().is_none());
        exercise(&mut store);
    }

    #[test]
    fn test_memory_store() {
        exercise(&mut MemoryStore::default());
    }

    #[test]
    fn test_any_store_delegates() {
        exercise(&mut AnyStore::Memory(MemoryStore::default()));
        exercise(&mut AnyStore::Sqlite(SqliteStore::open_in_memory().unwrap()));
    }
}
