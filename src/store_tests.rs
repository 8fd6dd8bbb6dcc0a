use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use super::{EntityStore, StoreError};
use crate::domain::log_entry::{LogDraft, LogEntry};
use crate::domain::point::{running_total, PointDraft, PointEntry};
use crate::domain::task::{Priority, Task, TaskDraft, TaskStatus};
use crate::storage::{KvBackend, MemoryBackend, Storage, StorageError, POINTS_KEY, TASKS_KEY};

fn task_draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "prep for open day".to_string(),
        assignee: "Mei".to_string(),
        due_date: "2026-10-20".to_string(),
        priority: Priority::High,
        ..TaskDraft::default()
    }
}

fn point_draft(change: &str) -> PointDraft {
    PointDraft {
        date: "2026-10-16".to_string(),
        name: "Ana".to_string(),
        event: "spelling bee".to_string(),
        change: change.to_string(),
        reason: "placed".to_string(),
        confirmed_by: "Mr. Diaz".to_string(),
    }
}

/// Backend whose writes can be switched off to simulate a full disk.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail_writes: Cell<bool>,
}

impl KvBackend for FlakyBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(key, value)
    }
}

#[test]
fn create_assigns_unique_ids_and_persists() {
    let storage = Storage::in_memory();
    let mut store: EntityStore<Task> = EntityStore::load(storage.clone());

    let mut ids = HashSet::new();
    for n in 0..25 {
        let task = store
            .create(task_draft(&format!("Task {n}")))
            .expect("create should succeed");
        assert!(task.id.starts_with("T-"));
        assert!(ids.insert(task.id), "id must be unique");
    }
    assert_eq!(store.list().len(), 25);

    let reloaded: EntityStore<Task> = EntityStore::load(storage);
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn list_preserves_insertion_order() {
    let mut store: EntityStore<Task> = EntityStore::load(Storage::in_memory());
    let titles = ["first", "second", "third"];
    for title in titles {
        store.create(task_draft(title)).expect("create should succeed");
    }
    let listed = store
        .list()
        .iter()
        .map(|task| task.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(listed, titles);
}

#[test]
fn create_with_empty_title_is_rejected_without_mutation() {
    let storage = Storage::in_memory();
    let mut store: EntityStore<Task> = EntityStore::load(storage.clone());
    store.create(task_draft("keep")).expect("create should succeed");
    let before = storage.raw(TASKS_KEY);

    let err = store
        .create(task_draft(""))
        .expect_err("empty title should fail");
    match err {
        StoreError::Validation(validation) => assert_eq!(validation.fields(), vec!["title"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.list().len(), 1);
    assert_eq!(storage.raw(TASKS_KEY), before);
}

#[test]
fn update_replaces_fields_in_place_and_keeps_id() {
    let mut store: EntityStore<Task> = EntityStore::load(Storage::in_memory());
    let first = store.create(task_draft("first")).expect("create");
    let second = store.create(task_draft("second")).expect("create");
    let third = store.create(task_draft("third")).expect("create");

    let mut edit = second.to_draft();
    edit.title = "second, revised".to_string();
    edit.status = TaskStatus::InProgress;
    let updated = store.update(&second.id, edit).expect("update should succeed");

    assert_eq!(updated.id, second.id);
    assert_eq!(store.list().len(), 3);
    let matching = store
        .list()
        .iter()
        .filter(|task| task.id == second.id)
        .collect::<Vec<_>>();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title, "second, revised");
    assert_eq!(matching[0].status, TaskStatus::InProgress);
    assert_eq!(store.list()[1].id, second.id);
    assert_eq!(store.get(&first.id), Some(&first));
    assert_eq!(store.get(&third.id), Some(&third));
}

#[test]
fn update_of_missing_id_reports_not_found() {
    let mut store: EntityStore<LogEntry> = EntityStore::load(Storage::in_memory());
    let err = store
        .update("L-none", LogDraft::default())
        .expect_err("missing id should fail");
    assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "L-none"));
}

#[test]
fn update_with_invalid_fields_leaves_entity_unchanged() {
    let mut store: EntityStore<Task> = EntityStore::load(Storage::in_memory());
    let task = store.create(task_draft("stable")).expect("create");
    let mut edit = task.to_draft();
    edit.assignee = "   ".to_string();
    let err = store.update(&task.id, edit).expect_err("blank assignee should fail");
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get(&task.id), Some(&task));
}

#[test]
fn delete_removes_exactly_one_entity() {
    let storage = Storage::in_memory();
    let mut store: EntityStore<Task> = EntityStore::load(storage.clone());
    let keep = store.create(task_draft("keep")).expect("create");
    let removed = store.create(task_draft("drop")).expect("create");

    store.delete(&removed.id).expect("delete should succeed");
    assert_eq!(store.list().len(), 1);
    assert!(store.get(&removed.id).is_none());
    assert_eq!(store.list()[0], keep);

    let reloaded: EntityStore<Task> = EntityStore::load(storage);
    assert_eq!(reloaded.list(), vec![keep].as_slice());
}

#[test]
fn delete_of_missing_id_leaves_storage_byte_identical() {
    let storage = Storage::in_memory();
    let mut store: EntityStore<Task> = EntityStore::load(storage.clone());
    store.create(task_draft("one")).expect("create");
    store.create(task_draft("two")).expect("create");
    let before = storage.raw(TASKS_KEY);

    let err = store.delete("T-zzzz").expect_err("missing id should fail");
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(store.list().len(), 2);
    assert_eq!(storage.raw(TASKS_KEY), before);
}

#[test]
fn running_total_tracks_every_mutation() {
    let storage = Storage::in_memory();
    let mut store: EntityStore<PointEntry> = EntityStore::load(storage.clone());
    store.create(point_draft("4")).expect("create");
    let negative = store.create(point_draft("-2")).expect("create");
    store.create(point_draft("3")).expect("create");
    assert_eq!(running_total(store.list()), 5);

    store.delete(&negative.id).expect("delete");
    assert_eq!(running_total(store.list()), 7);

    let first_id = store.list()[0].id.clone();
    store
        .update(&first_id, point_draft("10"))
        .expect("update");
    assert_eq!(running_total(store.list()), 13);

    let reloaded: EntityStore<PointEntry> = EntityStore::load(storage.clone());
    assert_eq!(running_total(reloaded.list()), 13);
    assert!(storage.raw(POINTS_KEY).is_some());
}

#[test]
fn failed_write_rolls_back_memory() {
    let backend = Rc::new(FlakyBackend::default());
    let storage = Storage::new(backend.clone());
    let mut store: EntityStore<Task> = EntityStore::load(storage);
    let existing = store.create(task_draft("existing")).expect("create");

    backend.fail_writes.set(true);

    let err = store
        .create(task_draft("lost"))
        .expect_err("create should surface the write failure");
    assert!(matches!(err, StoreError::Storage(_)));
    assert_eq!(store.list().len(), 1);

    let mut edit = existing.to_draft();
    edit.title = "renamed".to_string();
    assert!(store.update(&existing.id, edit).is_err());
    assert_eq!(store.get(&existing.id), Some(&existing));

    assert!(store.delete(&existing.id).is_err());
    assert_eq!(store.list(), vec![existing].as_slice());
}
