//! The profile singleton shown on the landing page.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Profile stored at `profile`. Read and written wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub headlines: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub intro: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile_pic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub experience_years: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub clients_completed: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub facebook: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub instagram: String,
}

impl Profile {
    /// Headlines joined for a single-line editor.
    pub fn headlines_csv(&self) -> String {
        self.headlines.join(", ")
    }

    /// Replace the headlines from a comma-separated list, dropping blanks.
    pub fn set_headlines_csv(&mut self, csv: &str) {
        self.headlines = csv
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
    }
}
