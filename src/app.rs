use std::error::Error;
use std::fmt;

use crate::config::ConfigError;
use crate::domain::log_entry::{LogDraft, LogEntry};
use crate::domain::point::{PointDraft, PointEntry};
use crate::domain::task::{Task, TaskDraft, TaskStatus};
use crate::domain::validation::ValidationError;
use crate::form::{drop_task, DropOutcome, Form, Interaction};
use crate::gate::{AccessGate, AuthError, GateError, GateState};
use crate::render::{render_board, render_log, render_points, ViewKind, ViewUpdate};
use crate::storage::{Storage, StorageError};
use crate::store::{EntityKind, EntityStore, Record, StoreError};

type Subscriber = Box<dyn FnMut(&ViewUpdate)>;

/// Owns the three collections and the settings gate. Every user action enters
/// through [`App::dispatch`].
pub struct App {
    tasks: EntityStore<Task>,
    logs: EntityStore<LogEntry>,
    points: EntityStore<PointEntry>,
    gate: AccessGate,
    subscribers: Vec<Subscriber>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetCredential {
        password: String,
        confirmation: Option<String>,
    },
    Unlock {
        password: String,
    },
    Lock,
    ShowView(ViewKind),
    SubmitTask {
        editing: Option<String>,
        draft: TaskDraft,
    },
    SubmitLog {
        editing: Option<String>,
        draft: LogDraft,
    },
    SubmitPoint {
        editing: Option<String>,
        draft: PointDraft,
    },
    DeleteTask {
        id: String,
    },
    DeleteLog {
        id: String,
    },
    DeletePoint {
        id: String,
    },
    DropTask {
        id: String,
        status: TaskStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Gate(GateState),
    View(ViewUpdate),
    Task(Task),
    Log(LogEntry),
    Point(PointEntry),
    Deleted { kind: EntityKind, id: String },
    Cancelled,
}

impl App {
    pub fn open(db_path: &str) -> Result<Self, AppError> {
        let storage = Storage::open_sqlite(db_path)?;
        Ok(Self::with_storage(storage))
    }

    pub fn with_storage(storage: Storage) -> Self {
        Self {
            tasks: EntityStore::load(storage.clone()),
            logs: EntityStore::load(storage.clone()),
            points: EntityStore::load(storage.clone()),
            gate: AccessGate::load(storage),
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// The settings view is only rendered while unlocked.
    pub fn view(&self, kind: ViewKind) -> Result<ViewUpdate, AppError> {
        if kind == ViewKind::Settings {
            self.gate.require_unlocked()?;
        }
        Ok(self.render(kind))
    }

    pub fn edit_task_form(&self, id: &str) -> Result<Form<Task>, AppError> {
        Ok(Form::open_edit(&self.tasks, id)?)
    }

    pub fn edit_log_form(&self, id: &str) -> Result<Form<LogEntry>, AppError> {
        Ok(Form::open_edit(&self.logs, id)?)
    }

    pub fn edit_point_form(&self, id: &str) -> Result<Form<PointEntry>, AppError> {
        self.gate.require_unlocked()?;
        Ok(Form::open_edit(&self.points, id)?)
    }

    pub fn dispatch(
        &mut self,
        command: Command,
        interaction: &mut dyn Interaction,
    ) -> Result<Outcome, AppError> {
        match command {
            Command::SetCredential {
                password,
                confirmation,
            } => {
                let state = self
                    .gate
                    .set_credential(&password, confirmation.as_deref())?;
                Ok(Outcome::Gate(state))
            }
            Command::Unlock { password } => Ok(Outcome::Gate(self.gate.submit(&password)?)),
            Command::Lock => Ok(Outcome::Gate(self.gate.lock())),
            Command::ShowView(kind) => Ok(Outcome::View(self.view(kind)?)),
            Command::SubmitTask { editing, draft } => {
                let task = submit_form(&mut self.tasks, editing, draft);
                let task = self.refresh_on_not_found(task, ViewKind::Board)?;
                self.publish(ViewKind::Board);
                Ok(Outcome::Task(task))
            }
            Command::SubmitLog { editing, draft } => {
                let entry = submit_form(&mut self.logs, editing, draft);
                let entry = self.refresh_on_not_found(entry, ViewKind::Log)?;
                self.publish(ViewKind::Log);
                Ok(Outcome::Log(entry))
            }
            Command::SubmitPoint { editing, draft } => {
                self.gate.require_unlocked()?;
                let entry = submit_form(&mut self.points, editing, draft);
                let entry = self.refresh_on_not_found(entry, ViewKind::Settings)?;
                self.publish(ViewKind::Settings);
                Ok(Outcome::Point(entry))
            }
            Command::DeleteTask { id } => {
                let outcome = delete_confirmed(&mut self.tasks, &id, interaction);
                let outcome = self.refresh_on_not_found(outcome, ViewKind::Board)?;
                self.publish_if_deleted(&outcome, ViewKind::Board);
                Ok(outcome)
            }
            Command::DeleteLog { id } => {
                let outcome = delete_confirmed(&mut self.logs, &id, interaction);
                let outcome = self.refresh_on_not_found(outcome, ViewKind::Log)?;
                self.publish_if_deleted(&outcome, ViewKind::Log);
                Ok(outcome)
            }
            Command::DeletePoint { id } => {
                self.gate.require_unlocked()?;
                let outcome = delete_confirmed(&mut self.points, &id, interaction);
                let outcome = self.refresh_on_not_found(outcome, ViewKind::Settings)?;
                self.publish_if_deleted(&outcome, ViewKind::Settings);
                Ok(outcome)
            }
            Command::DropTask { id, status } => {
                let dropped = drop_task(&mut self.tasks, &id, status, interaction)
                    .map_err(AppError::from);
                let task = match self.refresh_on_not_found(dropped, ViewKind::Board)? {
                    DropOutcome::Moved(task) | DropOutcome::Unchanged(task) => task,
                };
                self.publish(ViewKind::Board);
                Ok(Outcome::Task(task))
            }
        }
    }

    fn render(&self, kind: ViewKind) -> ViewUpdate {
        match kind {
            ViewKind::Board => ViewUpdate::Board(render_board(self.tasks.list())),
            ViewKind::Log => ViewUpdate::Log(render_log(self.logs.list())),
            ViewKind::Settings => ViewUpdate::Points(render_points(self.points.list())),
        }
    }

    fn publish(&mut self, kind: ViewKind) {
        if self.subscribers.is_empty() {
            return;
        }
        let update = self.render(kind);
        for subscriber in &mut self.subscribers {
            subscriber(&update);
        }
    }

    /// A stale id leaves state untouched, but listeners still redraw from it.
    fn refresh_on_not_found<T>(
        &mut self,
        result: Result<T, AppError>,
        kind: ViewKind,
    ) -> Result<T, AppError> {
        if let Err(AppError::NotFound { .. }) = &result {
            self.publish(kind);
        }
        result
    }

    fn publish_if_deleted(&mut self, outcome: &Outcome, kind: ViewKind) {
        if matches!(outcome, Outcome::Deleted { .. }) {
            self.publish(kind);
        }
    }
}

fn submit_form<R: Record>(
    store: &mut EntityStore<R>,
    editing: Option<String>,
    draft: R::Draft,
) -> Result<R, AppError> {
    let kind = R::KIND;
    let mut form = Form::<R>::with_draft(editing, draft);
    form.submit(store).map_err(|err| {
        if let Some(feedback) = form.feedback() {
            tracing::info!(%kind, editing = ?form.editing(), feedback, "submission rejected");
        }
        AppError::from(err)
    })
}

fn delete_confirmed<R: Record>(
    store: &mut EntityStore<R>,
    id: &str,
    interaction: &mut dyn Interaction,
) -> Result<Outcome, AppError> {
    if store.get(id).is_none() {
        return Err(AppError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        });
    }
    let kind = R::KIND;
    if !interaction.confirm(&format!("Delete {} {}?", kind, id)) {
        tracing::info!(%kind, id, "delete declined");
        return Ok(Outcome::Cancelled);
    }
    store.delete(id)?;
    Ok(Outcome::Deleted {
        kind,
        id: id.to_string(),
    })
}

#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    Storage(StorageError),
    Validation(ValidationError),
    Auth(AuthError),
    NotFound { kind: EntityKind, id: String },
    InvalidArgument(String),
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::Auth(err) => write!(f, "{}", err),
            AppError::NotFound { kind, id } => write!(f, "{} '{}' not found", kind, id),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
            AppError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Auth(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::NotFound { .. } | AppError::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        AppError::Storage(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        AppError::Auth(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => AppError::Validation(err),
            StoreError::NotFound { kind, id } => AppError::NotFound { kind, id },
            StoreError::Storage(err) => AppError::Storage(err),
        }
    }
}

impl From<GateError> for AppError {
    fn from(value: GateError) -> Self {
        match value {
            GateError::Auth(err) => AppError::Auth(err),
            GateError::Validation(err) => AppError::Validation(err),
            GateError::Storage(err) => AppError::Storage(err),
        }
    }
}
