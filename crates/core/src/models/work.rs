use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// A client success story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientWork {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub review_text: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClientWork {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,
    #[validate(length(min = 1, message = "Review text is required"))]
    pub review_text: String,
    pub image: String,
}
