use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::{optional_text, Checker, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To do",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseTaskFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseTaskFieldError::new(
                "status",
                value,
                &TaskStatus::ALL.map(TaskStatus::as_str),
            )),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TaskStatus::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseTaskFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseTaskFieldError::new(
                "priority",
                value,
                &Priority::ALL.map(Priority::as_str),
            )),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Priority::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskFieldError {
    field: &'static str,
    value: String,
    expected: String,
}

impl ParseTaskFieldError {
    fn new(field: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

impl fmt::Display for ParseTaskFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid task {} '{}': expected one of {}",
            self.field, self.value, self.expected
        )
    }
}

impl Error for ParseTaskFieldError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assignee: String,
    pub due_date: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Task {
    pub fn has_cancel_reason(&self) -> bool {
        self.cancel_reason
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty())
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            due_date: self.due_date.clone(),
            priority: self.priority,
            status: self.status,
            cancel_reason: self.cancel_reason.clone().unwrap_or_default(),
            attachments: self.attachments.clone(),
        }
    }
}

/// Unvalidated task input as captured by a form or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub cancel_reason: String,
    pub attachments: Vec<String>,
}

pub fn validate_task(id: String, draft: TaskDraft) -> Result<Task, ValidationError> {
    let mut checker = Checker::default();
    let title = checker.required("title", &draft.title);
    let assignee = checker.required("assignee", &draft.assignee);
    let due_date = checker.required("due_date", &draft.due_date);

    checker.finish(Task {
        id,
        title,
        description: draft.description.trim().to_string(),
        assignee,
        due_date,
        priority: draft.priority,
        status: draft.status,
        cancel_reason: optional_text(&draft.cancel_reason),
        attachments: draft
            .attachments
            .iter()
            .filter_map(|link| optional_text(link))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::{validate_task, Priority, TaskDraft, TaskStatus};
    use std::str::FromStr;

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "Water the plants".to_string(),
            assignee: "Jonas".to_string(),
            due_date: "2026-10-18".to_string(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn parses_status_spellings_from_both_legacy_schemes() {
        assert_eq!(TaskStatus::from_str("to-do").unwrap(), TaskStatus::Todo);
        assert_eq!(
            TaskStatus::from_str("In-Progress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            TaskStatus::from_str("in_progress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            TaskStatus::from_str("canceled").unwrap(),
            TaskStatus::Cancelled
        );
    }

    #[test]
    fn rejects_unknown_status_with_expected_values() {
        let err = TaskStatus::from_str("blocked").expect_err("unknown status should fail");
        let msg = err.to_string();
        assert!(msg.contains("invalid task status 'blocked'"));
        assert!(msg.contains("todo, inprogress, done, cancelled"));
    }

    #[test]
    fn priority_defaults_to_medium_and_serializes_lowercase() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(
            serde_json::to_string(&Priority::High).expect("serialize should work"),
            "\"high\""
        );
        let parsed: TaskStatus =
            serde_json::from_str("\"to-do\"").expect("legacy status should deserialize");
        assert_eq!(parsed, TaskStatus::Todo);
    }

    #[test]
    fn validation_names_each_missing_required_field() {
        let err = validate_task("T-1".to_string(), TaskDraft::default())
            .expect_err("empty draft should fail");
        assert_eq!(err.fields(), vec!["title", "assignee", "due_date"]);
    }

    #[test]
    fn cancel_reason_survives_status_changes() {
        let mut input = draft();
        input.cancel_reason = " rained out ".to_string();
        let task = validate_task("T-1".to_string(), input.clone()).expect("draft is valid");
        assert_eq!(task.cancel_reason.as_deref(), Some("rained out"));
        assert!(task.has_cancel_reason());

        input.cancel_reason = "  ".to_string();
        let task = validate_task("T-1".to_string(), input).expect("draft is valid");
        assert_eq!(task.cancel_reason, None);
    }

    #[test]
    fn cancelled_without_reason_is_accepted() {
        let mut input = draft();
        input.status = TaskStatus::Cancelled;
        let task = validate_task("T-1".to_string(), input).expect("form may omit reason");
        assert!(!task.has_cancel_reason());
    }

    #[test]
    fn blank_attachment_lines_are_dropped() {
        let mut input = draft();
        input.attachments = vec![
            " https://example.com/a ".to_string(),
            "  ".to_string(),
            "notes.pdf".to_string(),
        ];
        let task = validate_task("T-1".to_string(), input).expect("draft is valid");
        assert_eq!(task.attachments, vec!["https://example.com/a", "notes.pdf"]);
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let task: super::Task = serde_json::from_str(
            r#"{"id":"T-1","title":"x","assignee":"y","due_date":"2026-10-01"}"#,
        )
        .expect("minimal task should deserialize");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.attachments.is_empty());
    }
}
