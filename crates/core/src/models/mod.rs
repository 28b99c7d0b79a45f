//! Entity models and creation DTOs.
//!
//! Entity structs mirror the records the store holds (camelCase wire
//! names) plus the store key materialized as `id`. `New*` structs are what
//! the forms submit; they carry `validator` rules standing in for the
//! browser's built-in form validation.

pub mod analytics;
pub mod feedback;
pub mod inquiry;
pub mod keyed;
pub mod post;
pub mod profile;
pub mod service;
pub mod skill;
pub mod work;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::now_iso;

pub use analytics::{Analytics, TrafficSummary};
pub use feedback::{Feedback, NewFeedback, PendingFeedback};
pub use inquiry::{ContactMessage, HireRequest, HireSubmission, Inquiry, InquiryKind, NewInquiry};
pub use post::{NewPost, Post};
pub use profile::Profile;
pub use service::{NewReview, NewService, Review, Service};
pub use skill::{NewSkill, Skill};
pub use work::{ClientWork, NewClientWork};

/// An entity that lives in a top-level keyed collection.
pub trait Collection: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Top-level store path of the collection.
    const PATH: &'static str;

    /// Store key of this entity.
    fn id(&self) -> &str;
}

/// A creation payload stamped with its creation time.
#[derive(Debug, Clone, Serialize)]
pub struct Dated<T> {
    #[serde(flatten)]
    pub fields: T,
    pub date: String,
}

impl<T> Dated<T> {
    /// Stamp `fields` with the current time.
    pub fn now(fields: T) -> Self {
        Self {
            fields,
            date: now_iso(),
        }
    }
}

macro_rules! collection {
    ($ty:ty, $path:expr) => {
        impl Collection for $ty {
            const PATH: &'static str = $path;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

collection!(Skill, crate::paths::SKILLS);
collection!(Service, crate::paths::SERVICES);
collection!(ClientWork, crate::paths::WORKS);
collection!(Post, crate::paths::POSTS);
collection!(Feedback, crate::paths::FEEDBACK);
collection!(HireRequest, crate::paths::HIRE_REQUESTS);
collection!(ContactMessage, crate::paths::CONTACTS);
collection!(Analytics, crate::paths::ANALYTICS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_flattens_fields_next_to_date() {
        let payload = Dated::now(NewSkill {
            name: "SEO".into(),
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["name"], "SEO");
        assert!(crate::types::parse_iso(value["date"].as_str().unwrap()).is_some());
    }

    #[test]
    fn collection_paths_are_bit_exact() {
        assert_eq!(HireRequest::PATH, "hireRequests");
        assert_eq!(ContactMessage::PATH, "contacts");
        assert_eq!(ClientWork::PATH, "works");
        assert_eq!(Analytics::PATH, "analytics");
    }
}
