use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::log_entry::LogEntry;
use crate::domain::point::{running_total, PointEntry};
use crate::domain::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Board,
    Log,
    Settings,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewKind::Board => "board",
            ViewKind::Log => "log",
            ViewKind::Settings => "settings",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "board" | "kanban" => Ok(ViewKind::Board),
            "log" | "logs" => Ok(ViewKind::Log),
            "settings" | "points" => Ok(ViewKind::Settings),
            other => Err(format!(
                "unknown view '{other}': expected board, log, or settings"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
}

impl BoardView {
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|column| column.status == status)
            .map(|column| column.tasks.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogView {
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PointsView {
    pub entries: Vec<PointEntry>,
    pub total: i64,
}

/// What a subscriber receives after a collection changes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewUpdate {
    Board(BoardView),
    Log(LogView),
    Points(PointsView),
}

impl ViewUpdate {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewUpdate::Board(_) => ViewKind::Board,
            ViewUpdate::Log(_) => ViewKind::Log,
            ViewUpdate::Points(_) => ViewKind::Settings,
        }
    }
}

pub fn render_board(tasks: &[Task]) -> BoardView {
    let columns = TaskStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            tasks: tasks
                .iter()
                .filter(|task| task.status == *status)
                .cloned()
                .collect(),
        })
        .collect();
    BoardView { columns }
}

pub fn render_log(entries: &[LogEntry]) -> LogView {
    LogView {
        entries: entries.to_vec(),
    }
}

pub fn render_points(entries: &[PointEntry]) -> PointsView {
    PointsView {
        entries: entries.to_vec(),
        total: running_total(entries),
    }
}
