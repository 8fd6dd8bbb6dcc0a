use serde::{Deserialize, Serialize};

use super::validation::{optional_text, Checker, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub id: String,
    pub date: String,
    pub assignee: String,
    #[serde(default)]
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

impl LogEntry {
    pub fn to_draft(&self) -> LogDraft {
        LogDraft {
            date: self.date.clone(),
            assignee: self.assignee.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            link: self.link.clone().unwrap_or_default(),
            status: self.status.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDraft {
    pub date: String,
    pub assignee: String,
    pub category: String,
    pub description: String,
    pub link: String,
    pub status: String,
    pub notes: String,
}

pub fn validate_log(id: String, draft: LogDraft) -> Result<LogEntry, ValidationError> {
    let mut checker = Checker::default();
    let date = checker.required("date", &draft.date);
    let assignee = checker.required("assignee", &draft.assignee);
    let description = checker.required("description", &draft.description);

    checker.finish(LogEntry {
        id,
        date,
        assignee,
        category: draft.category.trim().to_string(),
        description,
        link: optional_text(&draft.link),
        status: draft.status.trim().to_string(),
        notes: draft.notes.trim().to_string(),
    })
}
