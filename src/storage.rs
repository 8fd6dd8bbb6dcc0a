use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db;

pub const TASKS_KEY: &str = "tasks";
pub const LOGS_KEY: &str = "logs";
pub const POINTS_KEY: &str = "points";
pub const PASSWORD_KEY: &str = "password";

/// Raw key-value access. Each write replaces the whole value for one key.
pub trait KvBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = db::open_connection(path)?;
        Ok(Self { conn })
    }
}

impl KvBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(db::get_value(&self.conn, key)?)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(db::set_value(&self.conn, key, value)?)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RefCell<BTreeMap<String, String>>,
}

impl KvBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed persistence over a shared backend. Cheap to clone; every entity
/// store and the access gate hold one.
#[derive(Clone)]
pub struct Storage {
    backend: Rc<dyn KvBackend>,
}

impl Storage {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn open_sqlite(path: &str) -> Result<Self, StorageError> {
        Ok(Self::new(Rc::new(SqliteBackend::open(path)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryBackend::default()))
    }

    /// Missing or unreadable values load as an empty collection.
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read stored collection");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored collection is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.backend.write(key, &raw)?;
        tracing::debug!(key, count = items.len(), "saved collection");
        Ok(())
    }

    pub fn load_text(&self, key: &str) -> Option<String> {
        let raw = match self.backend.read(key) {
            Ok(value) => value?,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str::<String>(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "stored value is corrupt, treating as absent");
                None
            }
        }
    }

    pub fn save_text(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(key, &raw)
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.read(key).ok().flatten()
    }

    #[cfg(test)]
    pub fn put_raw(&self, key: &str, value: &str) {
        self.backend
            .write(key, value)
            .expect("raw test write should succeed");
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Db(rusqlite::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "storage I/O error: {}", err),
            StorageError::Db(err) => write!(f, "storage database error: {}", err),
            StorageError::Encode(err) => write!(f, "failed to encode stored value: {}", err),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Db(err) => Some(err),
            StorageError::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        StorageError::Db(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Encode(value)
    }
}
