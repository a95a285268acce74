use std::fmt;

use thiserror::Error;

use crate::protocol::{TodoDraft, TodoPatch};

/// One failed form field, reported back to the form layer. These never reach
/// the network path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.field, field.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&summary)
    }
}

impl ValidationError {
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|candidate| candidate.field == field)
            .map(|candidate| candidate.message.as_str())
    }
}

fn title_required() -> FieldError {
    FieldError {
        field: "title",
        message: "Title is required".to_string(),
    }
}

/// Pre-submission check for the Add form. `description` is unconstrained.
pub fn validate_draft(draft: &TodoDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError {
            fields: vec![title_required()],
        });
    }
    Ok(())
}

/// Pre-submission check for the Edit form. A patch may leave the title alone,
/// but cannot blank it out.
pub fn validate_patch(patch: &TodoPatch) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(ValidationError {
                fields: vec![title_required()],
            });
        }
    }
    Ok(())
}
