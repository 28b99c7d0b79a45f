use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;
use crate::types::{parse_iso, Timestamp};

/// A journal post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image: String,
    /// ISO-8601 creation time.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
}

impl Post {
    pub fn published_at(&self) -> Option<Timestamp> {
        parse_iso(&self.date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub image: String,
}
