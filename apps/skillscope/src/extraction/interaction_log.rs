//! Interaction Logger — one JSON file per model exchange.
//!
//! Files are named `<agent-name>_<hex-suffix>.json`, opened with `create_new`
//! so an earlier run is never overwritten. The log parser reads them back
//! without calling the model again.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// 12 hex chars = 48 random bits.
const SUFFIX_LEN: usize = 12;
const MAX_NAME_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum InteractionLogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write interaction log {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize interaction log: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no free log filename after {0} attempts")]
    NameExhausted(u32),
}

/// One message of a model exchange, in request/response order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModelMessage {
    Request {
        parts: Vec<RequestPart>,
    },
    Response {
        parts: Vec<ResponsePart>,
        model_name: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum RequestPart {
    SystemPrompt {
        content: String,
        timestamp: DateTime<Utc>,
    },
    UserPrompt {
        content: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum ResponsePart {
    /// Structured output. `args` is the serialized tool input.
    ToolCall {
        tool_name: String,
        args: String,
        tool_call_id: String,
    },
    Text {
        content: String,
    },
}

/// The persisted record of a single extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLogEntry {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ModelMessage>,
    pub source: String,
}

/// Writes interaction logs into one directory, injected at construction.
#[derive(Debug, Clone)]
pub struct InteractionLogger {
    dir: PathBuf,
}

impl InteractionLogger {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, InteractionLogError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| InteractionLogError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists `entry` under a fresh `<agent_name>_<suffix>.json` name and
    /// returns the path written.
    pub fn log_interaction(
        &self,
        agent_name: &str,
        entry: &InteractionLogEntry,
    ) -> Result<PathBuf, InteractionLogError> {
        let body = serde_json::to_vec_pretty(entry)?;
        let stem = sanitize_agent_name(agent_name);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(format!("{stem}_{}.json", random_suffix()));
            let file = OpenOptions::new().write(true).create_new(true).open(&path);
            let mut file = match file {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Log filename {} already taken, drawing a new suffix", path.display());
                    continue;
                }
                Err(source) => return Err(InteractionLogError::Write { path, source }),
            };

            file.write_all(&body)
                .and_then(|_| file.sync_all())
                .map_err(|source| InteractionLogError::Write {
                    path: path.clone(),
                    source,
                })?;

            debug!("Interaction logged to {}", path.display());
            return Ok(path);
        }

        Err(InteractionLogError::NameExhausted(MAX_NAME_ATTEMPTS))
    }
}

fn random_suffix() -> String {
    // The leading hex digits of a v4 UUID are fully random.
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(SUFFIX_LEN);
    hex
}

fn sanitize_agent_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "agent".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> InteractionLogEntry {
        let now = Utc::now();
        InteractionLogEntry {
            provider: "anthropic".to_string(),
            model: "claude-haiku-4-5".to_string(),
            messages: vec![
                ModelMessage::Request {
                    parts: vec![RequestPart::UserPrompt {
                        content: "JOB_TITLE: \"data engineer\"".to_string(),
                        timestamp: now,
                    }],
                },
                ModelMessage::Response {
                    parts: vec![ResponsePart::ToolCall {
                        tool_name: "final_result".to_string(),
                        args: r#"{"job_title":"data engineer","skills":[]}"#.to_string(),
                        tool_call_id: "toolu_01".to_string(),
                    }],
                    model_name: Some("claude-haiku-4-5".to_string()),
                    timestamp: now,
                },
            ],
            source: "user".to_string(),
        }
    }

    #[test]
    fn test_log_file_name_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        let entry = sample_entry();

        let path = logger.log_interaction("skills_extractor", &entry).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        let suffix = name
            .strip_prefix("skills_extractor_")
            .and_then(|s| s.strip_suffix(".json"))
            .unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        let written: InteractionLogEntry =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, entry);
    }

    #[test]
    fn test_wire_shape_matches_log_parser_contract() {
        let value = serde_json::to_value(sample_entry()).unwrap();
        assert_eq!(value["provider"], "anthropic");
        assert_eq!(value["source"], "user");
        assert_eq!(value["messages"][0]["kind"], "request");
        assert_eq!(value["messages"][0]["parts"][0]["part_kind"], "user-prompt");
        assert_eq!(value["messages"][1]["kind"], "response");
        assert_eq!(value["messages"][1]["parts"][0]["part_kind"], "tool-call");
        assert!(value["messages"][1]["parts"][0]["args"].is_string());
    }

    #[test]
    fn test_repeated_calls_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path()).unwrap();
        let entry = sample_entry();

        let mut paths: Vec<PathBuf> = (0..50)
            .map(|_| logger.log_interaction("skills_extractor", &entry).unwrap())
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 50);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 50);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("run-1");
        let logger = InteractionLogger::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(logger.dir(), nested.as_path());
    }

    #[test]
    fn test_write_failure_is_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("gone");
        let logger = InteractionLogger::new(&target).unwrap();
        fs::remove_dir(&target).unwrap();

        let err = logger
            .log_interaction("skills_extractor", &sample_entry())
            .unwrap_err();
        assert!(matches!(err, InteractionLogError::Write { .. }));
    }

    #[test]
    fn test_agent_name_is_made_filename_safe() {
        assert_eq!(sanitize_agent_name("skills extractor/v2"), "skills_extractor_v2");
        assert_eq!(sanitize_agent_name(""), "agent");
    }
}
