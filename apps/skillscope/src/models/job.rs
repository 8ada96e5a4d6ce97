use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One job posting as delivered by ingestion. Every field is optional on input:
/// extraction degrades to empty prompt segments instead of rejecting a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_cleaned: Option<String>,
    /// HTML-bearing description text.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "Company Name")]
    pub company_name: Option<String>,
    /// Full-time, part-time, contract... Taken from `detected_extensions.schedule_type`
    /// when the record has no top-level value.
    #[serde(default, alias = "Schedule")]
    pub schedule: Option<String>,
    /// Derived from the relative `detected_extensions.posted_at` text on normalization.
    #[serde(default, skip_deserializing)]
    pub posted_at: Option<NaiveDate>,
    /// Remaining ingestion columns, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    /// Title used for prompting and for joining against the skill table.
    /// Falls back to the raw title when no cleaned title was derived.
    pub fn display_title(&self) -> &str {
        self.title_cleaned
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("")
    }
}
