//! Star ratings.
//!
//! Ratings are integers in `[1, 5]`. The store does not enforce the range,
//! so a stored rating may be missing, fractional or out of range; such
//! values decode without error and render as zero stars.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::lenient::as_integer;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A rating as stored. `raw` is `None` when the stored value was missing or
/// not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rating {
    raw: Option<i64>,
}

impl Rating {
    /// A validated rating for new records.
    pub fn new(stars: u8) -> Result<Self, CoreError> {
        if (MIN_RATING..=MAX_RATING).contains(&stars) {
            Ok(Self {
                raw: Some(i64::from(stars)),
            })
        } else {
            Err(CoreError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}, got {stars}"
            )))
        }
    }

    /// Number of stars to render: the stored value when it is in range,
    /// otherwise zero.
    pub fn stars(&self) -> u8 {
        match self.raw {
            Some(n) if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&n) => n as u8,
            _ => 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.stars() != 0
    }

    /// The stored integer, if there was one.
    pub fn raw(&self) -> Option<i64> {
        self.raw
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.raw {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self {
            raw: as_integer(&value),
        })
    }
}
