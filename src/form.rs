use time::macros::format_description;
use time::OffsetDateTime;

use crate::domain::log_entry::{LogDraft, LogEntry};
use crate::domain::point::{PointDraft, PointEntry};
use crate::domain::task::{Priority, Task, TaskDraft, TaskStatus};
use crate::domain::validation::ValidationError;
use crate::store::{EntityKind, EntityStore, Record, StoreError};

/// The user-facing collaborator a controller leans on mid-operation.
pub trait Interaction {
    fn confirm(&mut self, prompt: &str) -> bool;
    fn prompt_text(&mut self, prompt: &str) -> Option<String>;
}

/// Answers every question the same way.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    pub confirm: bool,
    pub text: Option<String>,
}

#[cfg(test)]
impl Interaction for Scripted {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.confirm
    }

    fn prompt_text(&mut self, _prompt: &str) -> Option<String> {
        self.text.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub today: String,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl FormDefaults {
    pub fn for_today(priority: Priority, status: TaskStatus) -> Self {
        Self {
            today: today_utc(),
            priority,
            status,
        }
    }
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self::for_today(Priority::default(), TaskStatus::default())
    }
}

pub fn today_utc() -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc()
        .date()
        .format(&format)
        .unwrap_or_default()
}

/// Create/edit form for one entity kind. The draft keeps whatever was entered
/// until a submission succeeds.
pub struct Form<R: Record> {
    editing: Option<String>,
    pub draft: R::Draft,
    feedback: Option<String>,
}

impl<R: Record> Form<R> {
    pub fn with_draft(editing: Option<String>, draft: R::Draft) -> Self {
        Self {
            editing,
            draft,
            feedback: None,
        }
    }

    pub fn open_edit(store: &EntityStore<R>, id: &str) -> Result<Self, StoreError> {
        let record = store.get(id).ok_or_else(|| StoreError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        })?;
        Ok(Self::with_draft(Some(id.to_string()), record.to_draft()))
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// On a validation failure the form stays as entered with feedback set.
    pub fn submit(&mut self, store: &mut EntityStore<R>) -> Result<R, StoreError> {
        let result = match self.editing.as_deref() {
            Some(id) => store.update(id, self.draft.clone()),
            None => store.create(self.draft.clone()),
        };
        match &result {
            Ok(_) => self.feedback = None,
            Err(StoreError::Validation(err)) => self.feedback = Some(feedback_text(err)),
            Err(err) => self.feedback = Some(err.to_string()),
        }
        result
    }
}

fn feedback_text(err: &ValidationError) -> String {
    let fields = err.fields().join(", ");
    format!("please fill in the required fields: {fields}")
}

impl Form<Task> {
    pub fn open_create(defaults: &FormDefaults) -> Self {
        Self::with_draft(
            None,
            TaskDraft {
                due_date: defaults.today.clone(),
                priority: defaults.priority,
                status: defaults.status,
                ..TaskDraft::default()
            },
        )
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.draft.status = status;
    }

    /// The reason field only shows while the selected status is cancelled.
    pub fn reason_visible(&self) -> bool {
        self.draft.status == TaskStatus::Cancelled
    }
}

impl Form<LogEntry> {
    pub fn open_create(defaults: &FormDefaults) -> Self {
        Self::with_draft(
            None,
            LogDraft {
                date: defaults.today.clone(),
                ..LogDraft::default()
            },
        )
    }
}

impl Form<PointEntry> {
    pub fn open_create(defaults: &FormDefaults) -> Self {
        Self::with_draft(
            None,
            PointDraft {
                date: defaults.today.clone(),
                ..PointDraft::default()
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved(Task),
    Unchanged(Task),
}

/// Moves a task card to another board column. Cancelling a task that has no
/// reason yet asks for one first; without an answer nothing changes.
pub fn drop_task(
    store: &mut EntityStore<Task>,
    id: &str,
    status: TaskStatus,
    interaction: &mut dyn Interaction,
) -> Result<DropOutcome, StoreError> {
    let task = store
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound {
            kind: EntityKind::Task,
            id: id.to_string(),
        })?;
    if task.status == status {
        return Ok(DropOutcome::Unchanged(task));
    }

    let mut draft = task.to_draft();
    draft.status = status;
    if status == TaskStatus::Cancelled && !task.has_cancel_reason() {
        let prompt = format!("Reason for cancelling '{}'", task.title);
        let reason = interaction
            .prompt_text(&prompt)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let Some(reason) = reason else {
            tracing::info!(id, "cancel drop aborted without a reason");
            return Err(StoreError::Validation(ValidationError::single(
                "cancel_reason",
                "a reason is required to cancel a task",
            )));
        };
        draft.cancel_reason = reason;
    }

    let moved = store.update(id, draft)?;
    tracing::info!(id, from = %task.status, to = %moved.status, "task moved");
    Ok(DropOutcome::Moved(moved))
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
