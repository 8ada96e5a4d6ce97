//! Skill Extractor — runs one extraction agent call per job, strictly in sequence.
//!
//! Flow per job: build_prompt → agent.run (under a timeout) → log interaction.
//! Every per-job failure is logged and counted; the batch always moves on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::extraction::interaction_log::{
    InteractionLogEntry, InteractionLogger, ModelMessage, RequestPart, ResponsePart,
};
use crate::extraction::prompt::{build_prompt, ExtractionPrompt};
use crate::extraction::prompts::{
    OUTPUT_SCHEMA_NAME, OUTPUT_TOOL_DESCRIPTION, OUTPUT_TOOL_NAME,
};
use crate::llm_client::prompts::{GROUNDED_EXTRACTION_SYSTEM, TOOL_ONLY_INSTRUCTION};
use crate::llm_client::{self, strip_json_fences, LlmClient, LlmError, LlmResponse, ToolDefinition};
use crate::models::job::JobRecord;
use crate::models::skill::SkillsList;

/// Source tag recorded in every interaction log written by the batch.
pub const DEFAULT_LOG_SOURCE: &str = "user";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
}

impl ExtractionError {
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractionError::Llm(e) => e.is_transient(),
            ExtractionError::Timeout(_) => true,
        }
    }
}

/// Result of one completed agent call.
///
/// `messages` is always the full exchange. `output` is `None` when the
/// response could not be coerced into `SkillsList`.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: Option<SkillsList>,
    pub messages: Vec<ModelMessage>,
}

/// An extraction agent: a model configured with the `SkillsList` output schema.
/// Implement this to swap providers without touching the batch loop.
#[async_trait]
pub trait ExtractionAgent: Send + Sync {
    /// Agent identifier; prefixes every interaction log filename.
    fn name(&self) -> &str;
    fn provider(&self) -> &str;
    fn model_name(&self) -> &str;
    async fn run(&self, prompt: &ExtractionPrompt) -> Result<AgentRun, ExtractionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmExtractionAgent — Claude with a forced structured-output tool
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmExtractionAgent {
    name: String,
    llm: LlmClient,
    system: String,
    input_schema: serde_json::Value,
}

impl LlmExtractionAgent {
    pub fn new(name: impl Into<String>, llm: LlmClient) -> Self {
        Self {
            name: name.into(),
            llm,
            system: format!("{GROUNDED_EXTRACTION_SYSTEM} {TOOL_ONLY_INSTRUCTION}"),
            input_schema: skills_list_schema(),
        }
    }
}

#[async_trait]
impl ExtractionAgent for LlmExtractionAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        llm_client::PROVIDER
    }

    fn model_name(&self) -> &str {
        llm_client::MODEL
    }

    async fn run(&self, prompt: &ExtractionPrompt) -> Result<AgentRun, ExtractionError> {
        let requested_at = Utc::now();
        let tool = ToolDefinition {
            name: OUTPUT_TOOL_NAME,
            description: OUTPUT_TOOL_DESCRIPTION,
            input_schema: &self.input_schema,
        };
        let response = self
            .llm
            .call_with_tool(prompt.as_str(), &self.system, tool)
            .await?;

        Ok(agent_run_from_response(
            &self.system,
            prompt,
            requested_at,
            &response,
        ))
    }
}

/// JSON schema of the `final_result` tool input (`SkillsList`).
fn skills_list_schema() -> serde_json::Value {
    json!({
        "title": OUTPUT_SCHEMA_NAME,
        "type": "object",
        "properties": {
            "job_title": {"type": "string"},
            "skills": {
                "type": "array",
                "items": {
                    "type": "string",
                    "description": "JSON object with skill_name, category, types_of_tools_or_technologies, evidence, confidence"
                }
            }
        },
        "required": ["job_title", "skills"]
    })
}

/// Rebuilds the request/response exchange from a provider answer and tries to
/// coerce it into `SkillsList`. Never fails: an uncoercible answer is kept in
/// the messages with `output = None`.
fn agent_run_from_response(
    system: &str,
    prompt: &ExtractionPrompt,
    requested_at: DateTime<Utc>,
    response: &LlmResponse,
) -> AgentRun {
    let request = ModelMessage::Request {
        parts: vec![
            RequestPart::SystemPrompt {
                content: system.to_string(),
                timestamp: requested_at,
            },
            RequestPart::UserPrompt {
                content: prompt.as_str().to_string(),
                timestamp: requested_at,
            },
        ],
    };

    let (part, output) = match response
        .tool_use(OUTPUT_TOOL_NAME)
        .and_then(|block| block.input.as_ref().map(|input| (block, input)))
    {
        Some((block, input)) => {
            let output = serde_json::from_value::<SkillsList>(input.clone()).ok();
            let part = ResponsePart::ToolCall {
                tool_name: OUTPUT_TOOL_NAME.to_string(),
                args: input.to_string(),
                tool_call_id: block
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
            };
            (part, output)
        }
        None => {
            let text = response.text().unwrap_or_default().to_string();
            let output = serde_json::from_str::<SkillsList>(strip_json_fences(&text)).ok();
            (ResponsePart::Text { content: text }, output)
        }
    };

    if output.is_none() {
        warn!(
            "Response for '{}' did not match {OUTPUT_SCHEMA_NAME}; keeping raw exchange only",
            prompt.job_title()
        );
    }

    AgentRun {
        output,
        messages: vec![
            request,
            ModelMessage::Response {
                parts: vec![part],
                model_name: Some(llm_client::MODEL.to_string()),
                timestamp: Utc::now(),
            },
        ],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Batch loop
// ────────────────────────────────────────────────────────────────────────────

/// What happened to a single job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Structured output received. `log_file` is `None` if the log write failed.
    Extracted {
        skills: usize,
        log_file: Option<PathBuf>,
    },
    /// The provider answered but the answer was not a `SkillsList`.
    Unparsed { log_file: Option<PathBuf> },
    /// Nothing to extract from: the cleaned description was empty.
    SkippedEmpty,
    Failed { transient: bool, message: String },
    TimedOut,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub unparsed: usize,
    pub skipped_empty: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub log_failures: usize,
    pub skills_extracted: usize,
    pub log_files: Vec<PathBuf>,
}

impl BatchReport {
    fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Extracted { skills, log_file } => {
                self.attempted += 1;
                self.succeeded += 1;
                self.skills_extracted += skills;
                self.push_log(log_file);
            }
            JobOutcome::Unparsed { log_file } => {
                self.attempted += 1;
                self.unparsed += 1;
                self.push_log(log_file);
            }
            JobOutcome::SkippedEmpty => self.skipped_empty += 1,
            JobOutcome::Failed { .. } => {
                self.attempted += 1;
                self.failed += 1;
            }
            JobOutcome::TimedOut => {
                self.attempted += 1;
                self.timed_out += 1;
            }
        }
    }

    fn push_log(&mut self, log_file: &Option<PathBuf>) {
        match log_file {
            Some(path) => self.log_files.push(path.clone()),
            None => self.log_failures += 1,
        }
    }
}

/// Drives an `ExtractionAgent` over a batch of jobs, one call at a time.
pub struct SkillExtractor {
    agent: Arc<dyn ExtractionAgent>,
    logger: InteractionLogger,
    timeout: Duration,
    source: String,
}

impl SkillExtractor {
    pub fn new(agent: Arc<dyn ExtractionAgent>, logger: InteractionLogger, timeout: Duration) -> Self {
        Self {
            agent,
            logger,
            timeout,
            source: DEFAULT_LOG_SOURCE.to_string(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Extracts skills for one prompt and logs the exchange. Never returns an error:
    /// every failure is folded into the `JobOutcome`.
    pub async fn extract_one(&self, prompt: &ExtractionPrompt) -> JobOutcome {
        let run = match tokio::time::timeout(self.timeout, self.agent.run(prompt)).await {
            Err(_) => {
                let e = ExtractionError::Timeout(self.timeout);
                warn!("Extraction for '{}' skipped: {e}", prompt.job_title());
                return JobOutcome::TimedOut;
            }
            Ok(Err(e)) => {
                error!("Extraction for '{}' failed: {e}", prompt.job_title());
                return JobOutcome::Failed {
                    transient: e.is_transient(),
                    message: e.to_string(),
                };
            }
            Ok(Ok(run)) => run,
        };

        let entry = InteractionLogEntry {
            provider: self.agent.provider().to_string(),
            model: self.agent.model_name().to_string(),
            messages: run.messages,
            source: self.source.clone(),
        };
        let log_file = match self.logger.log_interaction(self.agent.name(), &entry) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Interaction log for '{}' was not written: {e}", prompt.job_title());
                None
            }
        };

        match run.output {
            Some(list) => JobOutcome::Extracted {
                skills: list.skills.len(),
                log_file,
            },
            None => JobOutcome::Unparsed { log_file },
        }
    }

    /// Runs every job exactly once, in order. Skill counts outside the 5–10
    /// range asked for in the prompt are accepted as-is.
    pub async fn run_batch(&self, jobs: &[JobRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        let total = jobs.len();

        for (index, job) in jobs.iter().enumerate() {
            let prompt = build_prompt(job);
            let outcome = if prompt.has_description() {
                self.extract_one(&prompt).await
            } else {
                debug!("Job {} has no description, nothing to extract", index + 1);
                JobOutcome::SkippedEmpty
            };

            info!(
                "[{}/{}] '{}' -> {:?}",
                index + 1,
                total,
                job.display_title(),
                outcome
            );
            report.record(&outcome);
        }

        info!(
            "Batch finished: {} attempted, {} succeeded, {} unparsed, {} failed, {} timed out, {} skipped, {} log write failures",
            report.attempted,
            report.succeeded,
            report.unparsed,
            report.failed,
            report.timed_out,
            report.skipped_empty,
            report.log_failures
        );
        report
    }
}
