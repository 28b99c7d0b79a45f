//! Services and their nested reviews.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;
use crate::models::keyed::deserialize_keyed_map;
use crate::rating::Rating;

/// A service offering. `reviews` is the nested keyed sub-collection at
/// `services/{id}/reviews`; absence means zero reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image: String,
    #[serde(
        default,
        deserialize_with = "deserialize_keyed_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub reviews: BTreeMap<String, Review>,
}

impl Service {
    /// Reviews in store key order.
    pub fn review_list(&self) -> Vec<&Review> {
        self.reviews.values().collect()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// Mean star count over reviews whose rating is valid.
    pub fn average_rating(&self) -> Option<f32> {
        let stars: Vec<u8> = self
            .reviews
            .values()
            .map(|r| r.rating.stars())
            .filter(|&s| s > 0)
            .collect();
        if stars.is_empty() {
            return None;
        }
        Some(stars.iter().map(|&s| f32::from(s)).sum::<f32>() / stars.len() as f32)
    }
}

/// A client review, only ever nested under a [`Service`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reviewer_name: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewService {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(length(min = 1, message = "Reviewer name is required"))]
    pub reviewer_name: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "Comment is required"))]
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Default for NewReview {
    fn default() -> Self {
        Self {
            reviewer_name: String::new(),
            rating: 5,
            comment: String::new(),
            image: None,
        }
    }
}
