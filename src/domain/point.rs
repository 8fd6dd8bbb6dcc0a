use serde::{Deserialize, Serialize};

use super::validation::{Checker, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointEntry {
    pub id: String,
    pub date: String,
    pub name: String,
    pub event: String,
    pub change: i64,
    pub reason: String,
    pub confirmed_by: String,
}

impl PointEntry {
    pub fn to_draft(&self) -> PointDraft {
        PointDraft {
            date: self.date.clone(),
            name: self.name.clone(),
            event: self.event.clone(),
            change: self.change.to_string(),
            reason: self.reason.clone(),
            confirmed_by: self.confirmed_by.clone(),
        }
    }
}

/// `change` stays as entered text until validation parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointDraft {
    pub date: String,
    pub name: String,
    pub event: String,
    pub change: String,
    pub reason: String,
    pub confirmed_by: String,
}

pub fn validate_point(id: String, draft: PointDraft) -> Result<PointEntry, ValidationError> {
    let mut checker = Checker::default();
    let date = checker.required("date", &draft.date);
    let name = checker.required("name", &draft.name);
    let event = checker.required("event", &draft.event);
    let change = parse_change(&mut checker, &draft.change);
    let reason = checker.required("reason", &draft.reason);
    let confirmed_by = checker.required("confirmed_by", &draft.confirmed_by);

    checker.finish(PointEntry {
        id,
        date,
        name,
        event,
        change,
        reason,
        confirmed_by,
    })
}

fn parse_change(checker: &mut Checker, raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        checker.fail("change", "is required");
        return 0;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            checker.fail("change", format!("'{trimmed}' is not a whole number"));
            0
        }
    }
}

pub fn running_total(entries: &[PointEntry]) -> i64 {
    entries
        .iter()
        .fold(0i64, |total, entry| total.saturating_add(entry.change))
}
