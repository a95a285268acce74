use serde::{Deserialize, Serialize};

/// User-supplied fields for a new todo. Everything else on the record is
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }
}

/// Insert payload sent to the store. `completed` is always false for fresh
/// records; the draft carries the only fields the user controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

impl From<&TodoDraft> for CreateTodoRequest {
    fn from(draft: &TodoDraft) -> Self {
        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            completed: false,
        }
    }
}

/// Partial update. `None` fields are omitted from the wire and left untouched
/// by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_omits_unset_fields_on_the_wire() {
        let patch = TodoPatch::completed(true);
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn create_request_always_inserts_uncompleted() {
        let draft = TodoDraft::new("Buy milk", None);
        let request = CreateTodoRequest::from(&draft);
        assert!(!request.completed);
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "title": "Buy milk", "completed": false })
        );
    }

    #[test]
    fn empty_patch_is_detectable_before_sending() {
        assert!(TodoPatch::default().is_empty());
        assert!(!TodoPatch::completed(false).is_empty());
    }
}
