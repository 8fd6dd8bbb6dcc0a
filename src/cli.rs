use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::task::{Priority, TaskStatus};
use crate::render::ViewKind;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "classboard")]
#[command(bin_name = "classboard")]
#[command(version)]
#[command(about = "A local classroom kanban board, activity log and points ledger")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "CLASSBOARD_DB_PATH",
        default_value = ".classboard/state.sqlite",
        help = "Path to the local SQLite database."
    )]
    pub db: String,

    #[arg(
        short = 'c',
        long,
        env = "CLASSBOARD_CONFIG",
        default_value = ".classboard/config.toml",
        help = "Path to the optional TOML config file."
    )]
    pub config: PathBuf,

    #[arg(
        long,
        env = "CLASSBOARD_PASSWORD",
        hide_env_values = true,
        help = "Settings password; unlocks the points ledger for this run."
    )]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Manage tasks on the kanban board.")]
    Task(TaskArgs),
    #[command(about = "Manage activity log entries.")]
    Log(LogArgs),
    #[command(about = "Manage the points ledger (password protected).")]
    Points(PointsArgs),
    #[command(about = "Set or change the settings password.")]
    Password(PasswordArgs),
    #[command(about = "Print the board, log or settings view.")]
    View(ViewArgs),
    #[command(about = "Generate shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    #[command(about = "Add a task.")]
    Add(TaskAddArgs),
    #[command(about = "Edit fields of an existing task.")]
    Edit(TaskEditArgs),
    #[command(about = "Delete a task.")]
    Rm(RemoveArgs),
    #[command(about = "Move a task to another board column.")]
    Move(TaskMoveArgs),
    #[command(about = "Show the kanban board.")]
    Ls(ListArgs),
}

#[derive(Debug, Args)]
pub struct TaskFields {
    #[arg(short = 'a', long, help = "Who the task is assigned to.")]
    pub assignee: Option<String>,

    #[arg(long = "due", help = "Due date (YYYY-MM-DD).")]
    pub due_date: Option<String>,

    #[arg(short = 'p', long, help = "Priority: low, medium or high.")]
    pub priority: Option<Priority>,

    #[arg(short = 's', long, help = "Status: todo, inprogress, done or cancelled.")]
    pub status: Option<TaskStatus>,

    #[arg(long = "desc", help = "Description text.")]
    pub description: Option<String>,

    #[arg(long, help = "Reason the task was cancelled.")]
    pub reason: Option<String>,

    #[arg(
        long = "attach",
        help = "Attachment link; repeat for several. Replaces existing links on edit."
    )]
    pub attachments: Vec<String>,
}

impl TaskFields {
    pub fn has_changes(&self) -> bool {
        self.assignee.is_some()
            || self.due_date.is_some()
            || self.priority.is_some()
            || self.status.is_some()
            || self.description.is_some()
            || self.reason.is_some()
            || !self.attachments.is_empty()
    }
}

#[derive(Debug, Args)]
pub struct TaskAddArgs {
    #[arg(help = "Task title.")]
    pub title: String,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(Debug, Args)]
pub struct TaskEditArgs {
    #[arg(help = "Task id.")]
    pub id: String,

    #[arg(short = 't', long, help = "New title.")]
    pub title: Option<String>,

    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(Debug, Args)]
pub struct TaskMoveArgs {
    #[arg(help = "Task id.")]
    pub id: String,

    #[arg(help = "Destination column: todo, inprogress, done or cancelled.")]
    pub status: TaskStatus,

    #[arg(long, help = "Reason, when moving to cancelled.")]
    pub reason: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommands,
}

#[derive(Debug, Subcommand)]
pub enum LogCommands {
    #[command(about = "Add an activity log entry.")]
    Add(LogAddArgs),
    #[command(about = "Edit an activity log entry.")]
    Edit(LogEditArgs),
    #[command(about = "Delete an activity log entry.")]
    Rm(RemoveArgs),
    #[command(about = "Show the activity log.")]
    Ls(ListArgs),
}

#[derive(Debug, Args)]
pub struct LogFields {
    #[arg(long, help = "Entry date (YYYY-MM-DD), defaults to today.")]
    pub date: Option<String>,

    #[arg(short = 'a', long, help = "Who did the activity.")]
    pub assignee: Option<String>,

    #[arg(long, help = "Category label.")]
    pub category: Option<String>,

    #[arg(long, help = "Optional related link.")]
    pub link: Option<String>,

    #[arg(short = 's', long, help = "Free-text status.")]
    pub status: Option<String>,

    #[arg(long, help = "Extra notes.")]
    pub notes: Option<String>,
}

impl LogFields {
    pub fn has_changes(&self) -> bool {
        self.date.is_some()
            || self.assignee.is_some()
            || self.category.is_some()
            || self.link.is_some()
            || self.status.is_some()
            || self.notes.is_some()
    }
}

#[derive(Debug, Args)]
pub struct LogAddArgs {
    #[arg(help = "What happened.")]
    pub description: String,

    #[command(flatten)]
    pub fields: LogFields,
}

#[derive(Debug, Args)]
pub struct LogEditArgs {
    #[arg(help = "Log entry id.")]
    pub id: String,

    #[arg(long = "desc", help = "New description.")]
    pub description: Option<String>,

    #[command(flatten)]
    pub fields: LogFields,
}

#[derive(Debug, Args)]
pub struct PointsArgs {
    #[command(subcommand)]
    pub command: PointsCommands,
}

#[derive(Debug, Subcommand)]
pub enum PointsCommands {
    #[command(about = "Record a point change.")]
    Add(PointFields),
    #[command(about = "Edit a point entry.")]
    Edit(PointEditArgs),
    #[command(about = "Delete a point entry.")]
    Rm(RemoveArgs),
    #[command(about = "Show the ledger and running total.")]
    Ls(ListArgs),
}

#[derive(Debug, Args)]
pub struct PointFields {
    #[arg(long, help = "Entry date (YYYY-MM-DD), defaults to today.")]
    pub date: Option<String>,

    #[arg(short = 'n', long, help = "Whose points change.")]
    pub name: Option<String>,

    #[arg(short = 'e', long, help = "Event the points were earned or lost at.")]
    pub event: Option<String>,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Signed whole number, e.g. 5 or -2."
    )]
    pub change: Option<String>,

    #[arg(short = 'r', long, help = "Why the points changed.")]
    pub reason: Option<String>,

    #[arg(long = "confirmed-by", help = "Who confirmed the change.")]
    pub confirmed_by: Option<String>,
}

impl PointFields {
    pub fn has_changes(&self) -> bool {
        self.date.is_some()
            || self.name.is_some()
            || self.event.is_some()
            || self.change.is_some()
            || self.reason.is_some()
            || self.confirmed_by.is_some()
    }
}

#[derive(Debug, Args)]
pub struct PointEditArgs {
    #[arg(help = "Point entry id.")]
    pub id: String,

    #[command(flatten)]
    pub fields: PointFields,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[arg(help = "Id of the entry to delete.")]
    pub id: String,

    #[arg(short = 'y', long, help = "Delete without asking for confirmation.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Print JSON instead of a table.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommands,
}

#[derive(Debug, Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Set the settings password (unlock first if one exists).")]
    Set(PasswordSetArgs),
}

#[derive(Debug, Args)]
pub struct PasswordSetArgs {
    #[arg(help = "New password.")]
    pub new_password: String,

    #[arg(long, help = "Repeat the new password to confirm it.")]
    pub confirm: Option<String>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[arg(help = "board, log or settings.")]
    pub view: ViewKind,

    #[arg(long, help = "Print JSON instead of a table.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(help = "Shell to generate completions for.")]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, PointsCommands, TaskCommands};
    use crate::domain::task::{Priority, TaskStatus};
    use crate::render::ViewKind;
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_task_add_with_lenient_enums() {
        let cli = Cli::try_parse_from([
            "classboard",
            "task",
            "add",
            "Water plants",
            "-a",
            "Mei",
            "-p",
            "HIGH",
            "-s",
            "in-progress",
            "--attach",
            "a.pdf",
            "--attach",
            "b.pdf",
        ])
        .expect("args should parse");
        let Commands::Task(task) = cli.command else {
            panic!("expected task command");
        };
        let TaskCommands::Add(add) = task.command else {
            panic!("expected add");
        };
        assert_eq!(add.title, "Water plants");
        assert_eq!(add.fields.priority, Some(Priority::High));
        assert_eq!(add.fields.status, Some(TaskStatus::InProgress));
        assert_eq!(add.fields.attachments, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn negative_point_change_is_not_a_flag() {
        let cli = Cli::try_parse_from(["classboard", "points", "add", "--change", "-2"])
            .expect("args should parse");
        let Commands::Points(points) = cli.command else {
            panic!("expected points command");
        };
        let PointsCommands::Add(fields) = points.command else {
            panic!("expected add");
        };
        assert_eq!(fields.change.as_deref(), Some("-2"));
    }

    #[test]
    fn view_accepts_aliases_and_rejects_unknown() {
        let cli = Cli::try_parse_from(["classboard", "view", "kanban"]).expect("alias parses");
        let Commands::View(view) = cli.command else {
            panic!("expected view command");
        };
        assert_eq!(view.view, ViewKind::Board);
        assert!(Cli::try_parse_from(["classboard", "view", "attic"]).is_err());
    }
}
