//! Store paths.
//!
//! Every record lives at a slash-separated path in the document store. The
//! top-level names below are relied upon by the store's security rules and
//! must not change.

use std::fmt;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Top-level paths
-------------------------------------------------------------------------- */

/// The profile singleton.
pub const PROFILE: &str = "profile";
pub const SKILLS: &str = "skills";
pub const SERVICES: &str = "services";
/// Child of a single service: `services/{id}/reviews`.
pub const REVIEWS: &str = "reviews";
pub const WORKS: &str = "works";
pub const POSTS: &str = "posts";
pub const FEEDBACK: &str = "feedback";
pub const HIRE_REQUESTS: &str = "hireRequests";
pub const CONTACTS: &str = "contacts";
pub const ANALYTICS: &str = "analytics";

/// Characters the store refuses inside a key.
const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

/* --------------------------------------------------------------------------
StorePath
-------------------------------------------------------------------------- */

/// A validated, slash-separated location in the document store.
///
/// The empty path is the store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The store root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path such as `services/-Nabc/reviews`.
    ///
    /// Leading, trailing and repeated slashes are ignored, so `"/"` and `""`
    /// both name the root.
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let mut segments = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            validate_key(path, segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Path of a single child key below this one.
    pub fn child(&self, key: &str) -> Result<Self, CoreError> {
        if key.is_empty() {
            return Err(CoreError::InvalidPath {
                path: format!("{self}/"),
                reason: "empty key",
            });
        }
        validate_key(key, key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// Append every segment of `relative` to this path.
    pub fn join(&self, relative: &StorePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True when `self` equals `other` or contains it.
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        other.segments.len() >= self.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// True when a write at one path can change the value at the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

fn validate_key(path: &str, segment: &str) -> Result<(), CoreError> {
    if segment.chars().any(|c| FORBIDDEN.contains(&c) || c.is_control()) {
        return Err(CoreError::InvalidPath {
            path: path.to_string(),
            reason: "keys must not contain '.', '#', '$', '[', ']' or control characters",
        });
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Well-known paths
-------------------------------------------------------------------------- */

/// Path of a top-level collection or singleton by name.
///
/// Only used with the constants above, which are always valid.
pub fn top_level(name: &'static str) -> StorePath {
    StorePath {
        segments: vec![name.to_string()],
    }
}

/// `{collection}/{id}`
pub fn entity(collection: &'static str, id: &str) -> Result<StorePath, CoreError> {
    top_level(collection).child(id)
}

/// `services/{service_id}/reviews`
pub fn service_reviews(service_id: &str) -> Result<StorePath, CoreError> {
    entity(SERVICES, service_id)?.child(REVIEWS)
}

/// `services/{service_id}/reviews/{review_id}`
pub fn service_review(service_id: &str, review_id: &str) -> Result<StorePath, CoreError> {
    service_reviews(service_id)?.child(review_id)
}
