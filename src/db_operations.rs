use rusqlite::{params, Connection, OptionalExtension};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::errors::StorageError;

/// Key/value store local to one device (here: one chat).
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub fn check_or_create_db_tables(db_path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(db_path)?;

    // one row per (chat, key), like a browser's localStorage per origin
    conn.prepare(
        "create table if not exists local_storage (
        scope integer not null,
        key text not null,
        value text not null,
        primary key (scope, key)
        )",
    )?
    .execute([])?;

    Ok(())
}

/// sqlite backed storage, every chat gets its own scope
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db_path: PathBuf,
    scope: i64,
}

impl SqliteStorage {
    pub fn open(db_path: impl Into<PathBuf>, scope: i64) -> Result<Self, StorageError> {
        let db_path = db_path.into();
        check_or_create_db_tables(&db_path)?;
        Ok(SqliteStorage { db_path, scope })
    }

    pub fn scope(&self) -> i64 {
        self.scope
    }

    fn conn(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.db_path)
    }
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("SELECT value FROM local_storage WHERE scope = ?1 AND key = ?2")?;

        Ok(stmt
            .query_row(params![self.scope, key], |row| row.get(0))
            .optional()?)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "replace into local_storage (scope, key, value)
            values (?1, ?2, ?3)",
        )?;

        stmt.execute(params![self.scope, key, value])?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("DELETE FROM local_storage WHERE scope = ?1 AND key = ?2")?;

        stmt.execute(params![self.scope, key])?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}
