//! Log Parser — rebuilds the flat skill table from a directory of interaction logs.
//!
//! Reprocessing never touches the model. The structured output of each log lives
//! in `messages[1].parts[0].args`: a serialized `{job_title, skills}` blob whose
//! `skills` elements are themselves serialized skill records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::strip_json_fences;
use crate::models::skill::{SkillRecord, SkillRow};

const OUTPUT_POINTER: &str = "/messages/1/parts/0";

#[derive(Debug, Error)]
pub enum LogParseError {
    #[error("failed to read log directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Why a single log file contributed no rows.
#[derive(Debug, Error)]
pub enum LogFileError {
    #[error("unreadable: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing {0}")]
    Missing(&'static str),
}

/// Outcome of decoding one element of the `skills` sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillDecode {
    Decoded(SkillRecord),
    /// The original element text, kept so nothing is silently lost.
    Raw(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedLog {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedLogs {
    pub rows: Vec<SkillRow>,
    pub files_read: usize,
    pub skipped: Vec<SkippedLog>,
}

impl ParsedLogs {
    pub fn degraded_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_degraded()).count()
    }
}

/// Decodes one skill element. A JSON string is parsed as a record, an object
/// is read directly; anything else, or a record without `skill_name`, comes
/// back as `Raw`.
pub fn decode_skill(element: &Value) -> SkillDecode {
    match element {
        Value::String(text) => match serde_json::from_str::<SkillRecord>(strip_json_fences(text)) {
            Ok(record) => SkillDecode::Decoded(record),
            Err(e) => {
                debug!("Skill element kept raw ({e}): {text}");
                SkillDecode::Raw(text.clone())
            }
        },
        Value::Object(_) => match serde_json::from_value::<SkillRecord>(element.clone()) {
            Ok(record) => SkillDecode::Decoded(record),
            Err(_) => SkillDecode::Raw(element.to_string()),
        },
        other => SkillDecode::Raw(other.to_string()),
    }
}

/// Parses every `*.json` file in `dir`. Only an unreadable directory is an
/// error; unusable files are skipped and reported in `ParsedLogs::skipped`.
///
/// Files are visited in path order, so the same directory always yields the
/// same rows in the same order.
pub fn parse_log_dir(dir: &Path) -> Result<ParsedLogs, LogParseError> {
    let read_dir = fs::read_dir(dir).map_err(|source| LogParseError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut parsed = ParsedLogs::default();
    for path in paths {
        match parse_log_file(&path) {
            Ok(rows) => {
                parsed.files_read += 1;
                parsed.rows.extend(rows);
            }
            Err(e) => {
                warn!("Skipping log {}: {e}", path.display());
                parsed.skipped.push(SkippedLog {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Parsed {} log files from {}: {} rows ({} degraded), {} skipped",
        parsed.files_read,
        dir.display(),
        parsed.rows.len(),
        parsed.degraded_rows(),
        parsed.skipped.len()
    );
    Ok(parsed)
}

/// Parses a single interaction log into skill rows.
pub fn parse_log_file(path: &Path) -> Result<Vec<SkillRow>, LogFileError> {
    let bytes = fs::read(path)?;
    let entry: Value = serde_json::from_slice(&bytes)?;
    rows_from_entry(&entry)
}

fn rows_from_entry(entry: &Value) -> Result<Vec<SkillRow>, LogFileError> {
    let payload = output_payload(entry)?;

    let job_title = payload
        .get("job_title")
        .and_then(Value::as_str)
        .ok_or(LogFileError::Missing("job_title"))?;

    let rows = payload
        .get("skills")
        .and_then(Value::as_array)
        .map(|skills| {
            skills
                .iter()
                .map(|element| match decode_skill(element) {
                    SkillDecode::Decoded(record) => SkillRow::from_record(job_title, record),
                    SkillDecode::Raw(raw) => SkillRow::degraded(job_title, raw),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(rows)
}

/// Locates the structured output blob: tool-call `args`, or the `content` of a
/// plain-text answer that happens to hold the same JSON.
fn output_payload(entry: &Value) -> Result<Value, LogFileError> {
    let part = entry
        .pointer(OUTPUT_POINTER)
        .ok_or(LogFileError::Missing("messages[1].parts[0]"))?;

    let blob = part
        .get("args")
        .or_else(|| part.get("content"))
        .ok_or(LogFileError::Missing("args"))?;

    match blob {
        Value::String(text) => Ok(serde_json::from_str(strip_json_fences(text))?),
        Value::Object(_) => Ok(blob.clone()),
        _ => Err(LogFileError::Missing("args object")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::extraction::interaction_log::{
        InteractionLogEntry, InteractionLogger, ModelMessage, RequestPart, ResponsePart,
    };
    use crate::models::skill::SkillCategory;

    fn skill(name: &str) -> String {
        json!({
            "skill_name": name,
            "category": "hard",
            "types_of_tools_or_technologies": ["tool"],
            "evidence": format!("experience with {name}"),
            "confidence": 0.8
        })
        .to_string()
    }

    fn entry_with_args(args: String) -> InteractionLogEntry {
        let now = Utc::now();
        InteractionLogEntry {
            provider: "anthropic".to_string(),
            model: "claude-haiku-4-5".to_string(),
            messages: vec![
                ModelMessage::Request {
                    parts: vec![RequestPart::UserPrompt {
                        content: "prompt".to_string(),
                        timestamp: now,
                    }],
                },
                ModelMessage::Response {
                    parts: vec![ResponsePart::ToolCall {
                        tool_name: "final_result".to_string(),
                        args,
                        tool_call_id: "call_1".to_string(),
                    }],
                    model_name: None,
                    timestamp: now,
                },
            ],
            source: "user".to_string(),
        }
    }

    fn write_log(logger: &InteractionLogger, job_title: &str, skills: Vec<String>) -> PathBuf {
        let args = json!({"job_title": job_title, "skills": skills}).to_string();
        logger
            .log_interaction("skills_extractor", &entry_with_args(args))
            .unwrap()
    }

    fn sorted(rows: &[SkillRow]) -> Vec<String> {
        let mut keys: Vec<String> = rows.iter().map(|r| format!("{r:?}")).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_three_files_with_two_skills_each_yield_six_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        write_log(&logger, "data engineer", vec![skill("SQL"), skill("Python")]);
        write_log(&logger, "data analyst", vec![skill("Excel"), skill("Power BI")]);
        write_log(&logger, "data scientist", vec![skill("PyTorch"), skill("Statistics")]);

        let parsed = parse_log_dir(dir.path()).unwrap();

        assert_eq!(parsed.rows.len(), 6);
        assert_eq!(parsed.files_read, 3);
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.degraded_rows(), 0);
        let sql = parsed
            .rows
            .iter()
            .find(|r| r.skill_name.as_deref() == Some("SQL"))
            .unwrap();
        assert_eq!(sql.job_title, "data engineer");
        assert_eq!(sql.category, Some(SkillCategory::Hard));
        assert_eq!(sql.types_of_tools_or_technologies, Some(vec!["tool".to_string()]));
        assert_eq!(sql.evidence.as_deref(), Some("experience with SQL"));
    }

    #[test]
    fn test_malformed_skill_becomes_degraded_row() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        write_log(
            &logger,
            "data analyst",
            vec![skill("SQL"), "SQL, but not as JSON {".to_string()],
        );

        let parsed = parse_log_dir(dir.path()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        let full = parsed.rows.iter().find(|r| !r.is_degraded()).unwrap();
        assert_eq!(full.skill_name.as_deref(), Some("SQL"));
        assert!(full.category.is_some());
        assert!(full.evidence.is_some());

        let degraded = parsed.rows.iter().find(|r| r.is_degraded()).unwrap();
        assert_eq!(degraded.job_title, "data analyst");
        assert_eq!(degraded.raw_skill.as_deref(), Some("SQL, but not as JSON {"));
        assert!(degraded.skill_name.is_none());
        assert!(degraded.category.is_none());
        assert!(degraded.types_of_tools_or_technologies.is_none());
        assert!(degraded.evidence.is_none());
    }

    #[test]
    fn test_reparsing_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        write_log(&logger, "a", vec![skill("SQL"), "raw".to_string()]);
        write_log(&logger, "b", vec![skill("dbt")]);

        let first = parse_log_dir(dir.path()).unwrap();
        let second = parse_log_dir(dir.path()).unwrap();
        assert_eq!(sorted(&first.rows), sorted(&second.rows));
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn test_unusable_files_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        write_log(&logger, "data engineer", vec![skill("SQL")]);
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("request_only.json"), r#"{"messages": [{}]}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let parsed = parse_log_dir(dir.path()).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.files_read, 1);
        assert_eq!(parsed.skipped.len(), 2);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_log_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LogParseError::ReadDir { .. }));
    }

    #[test]
    fn test_args_as_object_and_text_content_are_accepted() {
        let as_object = json!({
            "messages": [
                {"kind": "request", "parts": []},
                {"kind": "response", "parts": [{
                    "part_kind": "tool-call",
                    "args": {"job_title": "data engineer", "skills": [{"skill_name": "Spark"}]}
                }]}
            ]
        });
        let rows = rows_from_entry(&as_object).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].skill_name.as_deref(), Some("Spark"));

        let as_text = json!({
            "messages": [
                {"kind": "request", "parts": []},
                {"kind": "response", "parts": [{
                    "part_kind": "text",
                    "content": "```json\n{\"job_title\": \"data analyst\", \"skills\": []}\n```"
                }]}
            ]
        });
        assert!(rows_from_entry(&as_text).unwrap().is_empty());
    }

    #[test]
    fn test_decode_skill_variants() {
        assert!(matches!(
            decode_skill(&json!(r#"{"skill_name": "SQL"}"#)),
            SkillDecode::Decoded(r) if r.skill_name == "SQL"
        ));
        assert_eq!(
            decode_skill(&json!(r#"{"category": "soft"}"#)),
            SkillDecode::Raw(r#"{"category": "soft"}"#.to_string())
        );
        assert_eq!(decode_skill(&json!(42)), SkillDecode::Raw("42".to_string()));
        assert!(matches!(
            decode_skill(&json!({"skill_name": "Teamwork", "category": "soft"})),
            SkillDecode::Decoded(_)
        ));
    }

    #[test]
    fn test_skill_with_odd_optional_fields_keeps_its_name() {
        let elements = [
            json!(r#"{"skill_name": "SQL", "category": "hard", "confidence": "high"}"#),
            json!(r#"{"skill_name": "Python", "evidence": ["pandas", "airflow"]}"#),
            json!(r#"{"skill_name": "Spark", "types_of_tools_or_technologies": [{"name": "Databricks"}]}"#),
            json!({"skill_name": "Teamwork", "category": ["soft"], "confidence": null}),
        ];
        let names: Vec<String> = elements
            .iter()
            .map(|e| match decode_skill(e) {
                SkillDecode::Decoded(record) => record.skill_name,
                SkillDecode::Raw(raw) => panic!("degraded: {raw}"),
            })
            .collect();
        assert_eq!(names, vec!["SQL", "Python", "Spark", "Teamwork"]);

        let SkillDecode::Decoded(python) = decode_skill(&elements[1]) else {
            unreachable!()
        };
        assert_eq!(python.evidence.as_deref(), Some("pandas; airflow"));
    }
}
