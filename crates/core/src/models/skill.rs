use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// A skill chip. Append-only with delete; no date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewSkill {
    #[validate(length(min = 1, message = "Skill name is required"))]
    pub name: String,
}
