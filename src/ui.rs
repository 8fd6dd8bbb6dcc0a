use std::io::{self, IsTerminal};

use crate::app::Outcome;
use crate::config::ColorMode;
use crate::domain::log_entry::LogEntry;
use crate::domain::point::PointEntry;
use crate::domain::task::{Priority, Task, TaskStatus};
use crate::render::{BoardView, LogView, PointsView, ViewUpdate};

pub fn print_view(update: &ViewUpdate, color: ColorMode) {
    let palette = Palette::for_mode(color);
    for line in format_view(update, &palette) {
        println!("{line}");
    }
}

pub fn print_outcome(outcome: &Outcome, color: ColorMode) {
    let palette = Palette::for_mode(color);
    for line in format_outcome(outcome, &palette) {
        println!("{line}");
    }
}

fn format_outcome(outcome: &Outcome, palette: &Palette) -> Vec<String> {
    match outcome {
        Outcome::Gate(state) => vec![format!("settings are {state}")],
        Outcome::View(update) => format_view(update, palette),
        Outcome::Task(task) => vec![format!(
            "{} {} {}",
            palette.id(&task.id),
            palette.dim(&format!("[{}]", task.status)),
            task.title
        )],
        Outcome::Log(entry) => vec![format_log_row(entry, palette)],
        Outcome::Point(entry) => vec![format_point_row(entry, palette)],
        Outcome::Deleted { kind, id } => vec![format!("deleted {kind} {}", palette.id(id))],
        Outcome::Cancelled => vec![palette.dim("nothing deleted")],
    }
}

fn format_view(update: &ViewUpdate, palette: &Palette) -> Vec<String> {
    match update {
        ViewUpdate::Board(board) => format_board(board, palette),
        ViewUpdate::Log(log) => format_log(log, palette),
        ViewUpdate::Points(points) => format_points(points, palette),
    }
}

fn format_board(board: &BoardView, palette: &Palette) -> Vec<String> {
    let mut lines = Vec::new();
    for column in &board.columns {
        lines.push(palette.heading(&format!(
            "{} ({})",
            column.status.label(),
            column.tasks.len()
        )));
        if column.tasks.is_empty() {
            lines.push(format!("  {}", palette.dim("empty")));
        }
        for task in &column.tasks {
            lines.push(format_task_row(task, palette));
            if task.status == TaskStatus::Cancelled {
                if let Some(reason) = task.cancel_reason.as_deref() {
                    lines.push(format!("    {}", palette.dim(&format!("reason: {reason}"))));
                }
            }
        }
    }
    lines
}

fn format_task_row(task: &Task, palette: &Palette) -> String {
    let mut line = format!(
        "  {} {} {} {}",
        palette.id(&task.id),
        palette.priority(task.priority),
        task.title,
        palette.dim(&format!("@{} due {}", task.assignee, task.due_date))
    );
    if !task.attachments.is_empty() {
        line.push(' ');
        line.push_str(&palette.dim(&format!("[{} link(s)]", task.attachments.len())));
    }
    line
}

fn format_log(log: &LogView, palette: &Palette) -> Vec<String> {
    let mut lines = vec![palette.heading("Activity log")];
    if log.entries.is_empty() {
        lines.push(palette.dim("no entries yet"));
        return lines;
    }
    lines.extend(log.entries.iter().map(|entry| format_log_row(entry, palette)));
    lines
}

fn format_log_row(entry: &LogEntry, palette: &Palette) -> String {
    let mut line = format!(
        "{} {} {}",
        palette.id(&entry.id),
        entry.date,
        palette.dim(&format!("@{}", entry.assignee))
    );
    if !entry.category.is_empty() {
        line.push_str(&format!(" [{}]", entry.category));
    }
    line.push(' ');
    line.push_str(&entry.description);
    if !entry.status.is_empty() {
        line.push_str(&format!(" ({})", entry.status));
    }
    if let Some(link) = entry.link.as_deref() {
        line.push(' ');
        line.push_str(&palette.dim(link));
    }
    line
}

fn format_points(points: &PointsView, palette: &Palette) -> Vec<String> {
    let mut lines = vec![palette.heading("Points")];
    lines.extend(
        points
            .entries
            .iter()
            .map(|entry| format_point_row(entry, palette)),
    );
    lines.push(palette.heading(&format!("total: {}", signed(points.total))));
    lines
}

fn format_point_row(entry: &PointEntry, palette: &Palette) -> String {
    format!(
        "{} {} {} {} {} {}",
        palette.id(&entry.id),
        entry.date,
        entry.name,
        palette.change(entry.change),
        entry.event,
        palette.dim(&format!("{} (confirmed by {})", entry.reason, entry.confirmed_by))
    )
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn for_mode(mode: ColorMode) -> Self {
        let enabled = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
            }
        };
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn priority(&self, priority: Priority) -> String {
        let upper = priority.as_str().to_ascii_uppercase();
        self.paint(priority_color_code(priority), &format!("[{upper}]"))
    }

    fn change(&self, change: i64) -> String {
        let code = if change < 0 { "31" } else { "32" };
        self.paint(code, &signed(change))
    }
}

fn priority_color_code(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "34",
        Priority::Medium => "33",
        Priority::High => "31",
    }
}

#[cfg(test)]
mod tests {
    use super::{format_outcome, format_view, Palette};
    use crate::app::Outcome;
    use crate::domain::point::PointEntry;
    use crate::domain::task::{Priority, Task, TaskStatus};
    use crate::gate::GateState;
    use crate::render::{render_board, render_log, render_points, ViewUpdate};
    use crate::store::EntityKind;

    fn plain() -> Palette {
        Palette { enabled: false }
    }

    fn task(id: &str, status: TaskStatus, reason: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("title {id}"),
            description: String::new(),
            assignee: "Mei".to_string(),
            due_date: "2026-10-20".to_string(),
            priority: Priority::High,
            status,
            cancel_reason: reason.map(str::to_string),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn board_lists_every_column_with_counts() {
        let tasks = vec![
            task("T-1", TaskStatus::Todo, None),
            task("T-2", TaskStatus::Cancelled, Some("rain")),
        ];
        let lines = format_view(&ViewUpdate::Board(render_board(&tasks)), &plain());
        assert_eq!(lines[0], "To do (1)");
        assert_eq!(lines[1], "  T-1 [HIGH] title T-1 @Mei due 2026-10-20");
        assert!(lines.contains(&"In progress (0)".to_string()));
        assert!(lines.contains(&"Cancelled (1)".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("    reason: rain"));
    }

    #[test]
    fn retained_reason_is_hidden_outside_the_cancelled_column() {
        let tasks = vec![task("T-1", TaskStatus::Done, Some("old reason"))];
        let lines = format_view(&ViewUpdate::Board(render_board(&tasks)), &plain());
        assert!(lines.iter().all(|line| !line.contains("old reason")));
    }

    #[test]
    fn empty_log_says_so() {
        let lines = format_view(&ViewUpdate::Log(render_log(&[])), &plain());
        assert_eq!(lines, vec!["Activity log", "no entries yet"]);
    }

    #[test]
    fn points_show_signed_changes_and_total() {
        let entry = |id: &str, change: i64| PointEntry {
            id: id.to_string(),
            date: "2026-10-16".to_string(),
            name: "Ana".to_string(),
            event: "Quiz".to_string(),
            change,
            reason: "answers".to_string(),
            confirmed_by: "Park".to_string(),
        };
        let entries = vec![entry("P-1", 4), entry("P-2", -2)];
        let lines = format_view(&ViewUpdate::Points(render_points(&entries)), &plain());
        assert_eq!(lines[1], "P-1 2026-10-16 Ana +4 Quiz answers (confirmed by Park)");
        assert!(lines[2].contains(" -2 "));
        assert_eq!(lines[3], "total: +2");
    }

    #[test]
    fn outcomes_read_as_short_status_lines() {
        let moved = task("T-9", TaskStatus::Done, None);
        assert_eq!(
            format_outcome(&Outcome::Task(moved), &plain()),
            vec!["T-9 [done] title T-9"]
        );
        assert_eq!(
            format_outcome(&Outcome::Gate(GateState::Gated), &plain()),
            vec!["settings are gated"]
        );
        assert_eq!(
            format_outcome(
                &Outcome::Deleted {
                    kind: EntityKind::Log,
                    id: "L-1".to_string(),
                },
                &plain()
            ),
            vec!["deleted log entry L-1"]
        );
        assert_eq!(
            format_outcome(&Outcome::Cancelled, &plain()),
            vec!["nothing deleted"]
        );
    }

    #[test]
    fn enabled_palette_wraps_in_ansi_codes() {
        let palette = Palette { enabled: true };
        assert_eq!(palette.dim("x"), "\x1b[2mx\x1b[0m");
    }
}
