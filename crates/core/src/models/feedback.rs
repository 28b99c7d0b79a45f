//! Public testimonials.
//!
//! Feedback is created unapproved by the public form and only shown once an
//! authenticated operator flips `isVisible`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;
use crate::rating::Rating;

/// Field flipped by the visibility toggle.
pub const VISIBLE_FIELD: &str = "isVisible";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_visible: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
}

impl Feedback {
    /// Approved for public display.
    pub fn is_approved(&self) -> bool {
        self.is_visible
    }

    /// First character of the name, for the avatar badge.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }
}

/// Only feedback an operator has approved, in store order.
pub fn approved(feedback: &[Feedback]) -> Vec<&Feedback> {
    feedback.iter().filter(|f| f.is_approved()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewFeedback {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl Default for NewFeedback {
    fn default() -> Self {
        Self {
            name: String::new(),
            rating: 5,
            message: String::new(),
        }
    }
}

/// Feedback as written by the public form: never visible on creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFeedback {
    #[serde(flatten)]
    pub feedback: NewFeedback,
    pub is_visible: bool,
}

impl From<NewFeedback> for PendingFeedback {
    fn from(feedback: NewFeedback) -> Self {
        Self {
            feedback,
            is_visible: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_feedback_is_never_visible() {
        let pending = PendingFeedback::from(NewFeedback {
            name: "Lee".into(),
            rating: 4,
            message: "Thanks".into(),
        });
        let value = serde_json::to_value(&pending).unwrap();
        assert_eq!(value["isVisible"], false);
        assert_eq!(value["rating"], 4);
        assert_eq!(value["name"], "Lee");
    }

    #[test]
    fn approved_filters_hidden_entries() {
        let list: Vec<Feedback> = vec![
            serde_json::from_value(json!({"id": "a", "name": "A", "isVisible": true})).unwrap(),
            serde_json::from_value(json!({"id": "b", "name": "B", "isVisible": false})).unwrap(),
            serde_json::from_value(json!({"id": "c", "name": "C"})).unwrap(),
        ];
        let ids: Vec<&str> = approved(&list).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn initial_of_empty_name_is_none() {
        assert_eq!(Feedback::default().initial(), None);
    }
}
