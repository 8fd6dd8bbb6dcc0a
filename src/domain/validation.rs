use std::error::Error;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field that failed validation for one submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|err| err.field).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .errors
            .iter()
            .map(|err| format!("{}: {}", err.field, err.message))
            .collect::<Vec<_>>();
        write!(f, "invalid input ({})", parts.join("; "))
    }
}

impl Error for ValidationError {}

/// Collects field errors while a draft is being checked.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn required(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fail(field, "is required");
        }
        trimmed.to_string()
    }

    pub fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{optional_text, Checker, ValidationError};

    #[test]
    fn checker_reports_every_missing_field_in_order() {
        let mut checker = Checker::default();
        let title = checker.required("title", "  ");
        let assignee = checker.required("assignee", " Mei ");
        checker.required("due_date", "");
        let err = checker
            .finish(())
            .expect_err("missing fields should be reported");
        assert_eq!(err.fields(), vec!["title", "due_date"]);
        assert!(title.is_empty());
        assert_eq!(assignee, "Mei");
    }

    #[test]
    fn display_lists_field_messages() {
        let err = ValidationError::single("change", "must be a whole number");
        assert_eq!(
            err.to_string(),
            "invalid input (change: must be a whole number)"
        );
        assert!(err.has_field("change"));
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_text(" x "), Some("x".to_string()));
    }
}
