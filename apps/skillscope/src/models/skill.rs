use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Whether a skill is technical or interpersonal. Anything the model labels
/// differently is kept as `Other` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Hard,
    Soft,
    Other,
}

impl SkillCategory {
    /// Maps free-form labels such as "Hard Skill" or "soft-skill".
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("hard") || label == "technical" {
            SkillCategory::Hard
        } else if label.starts_with("soft") || label == "interpersonal" {
            SkillCategory::Soft
        } else {
            SkillCategory::Other
        }
    }
}

impl<'de> Deserialize<'de> for SkillCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(SkillCategory::from_label(&label))
    }
}

/// A single skill as described by the model. Decoded from one element of
/// `SkillsList::skills`; only `skill_name` is mandatory. Every other field is
/// read on its own, and a value of the wrong shape is dropped rather than
/// failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill_name: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<SkillCategory>,
    #[serde(
        default,
        alias = "tools_or_technologies",
        alias = "types_of_tools_or_technologies_mentioned",
        deserialize_with = "string_or_list"
    )]
    pub types_of_tools_or_technologies: Vec<String>,
    /// Verbatim span the model claims appears in the description. Not verified.
    #[serde(default, deserialize_with = "lenient_evidence")]
    pub evidence: Option<String>,
    #[serde(default, deserialize_with = "clamped_confidence")]
    pub confidence: Option<f32>,
}

/// Structured output schema the extraction agent must answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsList {
    pub job_title: String,
    /// Each element is a serialized `SkillRecord`.
    #[serde(default)]
    pub skills: Vec<serde_json::Value>,
}

/// One row of the parsed skill table.
///
/// A degraded row (skill element that failed to decode) carries only
/// `job_title` and `raw_skill`; every other column is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRow {
    pub job_title: String,
    pub skill_name: Option<String>,
    pub category: Option<SkillCategory>,
    pub types_of_tools_or_technologies: Option<Vec<String>>,
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_skill: Option<String>,
}

impl SkillRow {
    pub fn from_record(job_title: &str, record: SkillRecord) -> Self {
        Self {
            job_title: job_title.to_string(),
            skill_name: Some(record.skill_name),
            category: record.category,
            types_of_tools_or_technologies: Some(record.types_of_tools_or_technologies),
            evidence: record.evidence,
            raw_skill: None,
        }
    }

    pub fn degraded(job_title: &str, raw_skill: String) -> Self {
        Self {
            job_title: job_title.to_string(),
            skill_name: None,
            category: None,
            types_of_tools_or_technologies: None,
            evidence: None,
            raw_skill: Some(raw_skill),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.raw_skill.is_some()
    }
}

fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SkillCategory>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) if !label.trim().is_empty() => Some(SkillCategory::from_label(&label)),
        Value::Array(items) => items
            .iter()
            .find_map(Value::as_str)
            .map(SkillCategory::from_label),
        _ => None,
    })
}

/// A list of spans is joined with "; ".
fn lenient_evidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let text = match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return Ok(None),
    };
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// A string, or a list of strings and `{"name": ...}` objects. Other shapes
/// yield an empty list.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        single => vec![single],
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

/// Numbers and numeric strings are clamped into `0.0..=1.0`; labels such as
/// "high" are dropped.
fn clamped_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0) as f32))
}
