use std::error::Error;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::log_entry::{validate_log, LogDraft, LogEntry};
use crate::domain::point::{validate_point, PointDraft, PointEntry};
use crate::domain::task::{validate_task, Task, TaskDraft};
use crate::domain::validation::ValidationError;
use crate::entity_id::generate_entity_id;
use crate::storage::{Storage, StorageError, LOGS_KEY, POINTS_KEY, TASKS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    Log,
    Point,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Log => "log entry",
            EntityKind::Point => "point entry",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            EntityKind::Task => TASKS_KEY,
            EntityKind::Log => LOGS_KEY,
            EntityKind::Point => POINTS_KEY,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Task => "T",
            EntityKind::Log => "L",
            EntityKind::Point => "P",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted entity kind. `from_draft` is the single validation entry
/// point for the kind.
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Draft: Clone;
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn to_draft(&self) -> Self::Draft;
    fn from_draft(id: String, draft: Self::Draft) -> Result<Self, ValidationError>;
}

impl Record for Task {
    type Draft = TaskDraft;
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> TaskDraft {
        Task::to_draft(self)
    }

    fn from_draft(id: String, draft: TaskDraft) -> Result<Self, ValidationError> {
        validate_task(id, draft)
    }
}

impl Record for LogEntry {
    type Draft = LogDraft;
    const KIND: EntityKind = EntityKind::Log;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> LogDraft {
        LogEntry::to_draft(self)
    }

    fn from_draft(id: String, draft: LogDraft) -> Result<Self, ValidationError> {
        validate_log(id, draft)
    }
}

impl Record for PointEntry {
    type Draft = PointDraft;
    const KIND: EntityKind = EntityKind::Point;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_draft(&self) -> PointDraft {
        PointEntry::to_draft(self)
    }

    fn from_draft(id: String, draft: PointDraft) -> Result<Self, ValidationError> {
        validate_point(id, draft)
    }
}

/// In-memory ordered collection of one kind, written through to storage
/// after every mutation. A failed operation leaves memory and storage as they
/// were.
pub struct EntityStore<R: Record> {
    storage: Storage,
    items: Vec<R>,
}

impl<R: Record> EntityStore<R> {
    pub fn load(storage: Storage) -> Self {
        let items = storage.load_collection(R::KIND.storage_key());
        Self { storage, items }
    }

    pub fn list(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn create(&mut self, draft: R::Draft) -> Result<R, StoreError> {
        let id = generate_entity_id(R::KIND.id_prefix(), |candidate| {
            self.items.iter().any(|item| item.id() == candidate)
        });
        let record = R::from_draft(id, draft)?;
        self.items.push(record.clone());
        if let Err(err) = self.persist() {
            self.items.pop();
            return Err(err);
        }
        tracing::info!(kind = %R::KIND, id = record.id(), "created");
        Ok(record)
    }

    pub fn update(&mut self, id: &str, draft: R::Draft) -> Result<R, StoreError> {
        let index = self.position(id)?;
        let record = R::from_draft(self.items[index].id().to_string(), draft)?;
        let previous = std::mem::replace(&mut self.items[index], record.clone());
        if let Err(err) = self.persist() {
            self.items[index] = previous;
            return Err(err);
        }
        tracing::info!(kind = %R::KIND, id, "updated");
        Ok(record)
    }

    pub fn delete(&mut self, id: &str) -> Result<R, StoreError> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);
        if let Err(err) = self.persist() {
            self.items.insert(index, removed);
            return Err(err);
        }
        tracing::info!(kind = %R::KIND, id, "deleted");
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            })
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.storage
            .save_collection(R::KIND.storage_key(), &self.items)?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { kind: EntityKind, id: String },
    Storage(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "{}", err),
            StoreError::NotFound { kind, id } => write!(f, "{} '{}' not found", kind, id),
            StoreError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Validation(err) => Some(err),
            StoreError::NotFound { .. } => None,
            StoreError::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        StoreError::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        StoreError::Storage(value)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
