/// LLM Client — the single point of entry for all Claude API calls in skillscope.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Extraction agents wrap this client; they never build HTTP requests themselves.
///
/// Model: claude-haiku-4-5 (hardcoded — do not make configurable to prevent drift
/// between extraction runs whose logs end up in the same directory)
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Provider tag written into every interaction log.
pub const PROVIDER: &str = "anthropic";
/// The model used for all LLM calls in skillscope.
pub const MODEL: &str = "claude-haiku-4-5";
const MAX_TOKENS: u32 = 4096;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Network failures, 429s and 5xx responses. The batch skips the job on these.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    tools: [ToolDefinition<'a>; 1],
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// A structured output tool the model is forced to call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub input_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    /// Present on `tool_use` blocks.
    pub id: Option<String>,
    pub name: Option<String>,
    pub input: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Returns the first `tool_use` block addressed to `tool_name`.
    pub fn tool_use(&self, tool_name: &str) -> Option<&ContentBlock> {
        self.content
            .iter()
            .find(|b| b.block_type == "tool_use" && b.name.as_deref() == Some(tool_name))
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by all services in skillscope.
/// Wraps the Anthropic Messages API with retry logic and forced tool-call helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    max_attempts: u32,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Caps the number of HTTP attempts per call. `1` disables retries entirely.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Calls the Claude API with a single tool and forces the model to use it.
    /// The tool input is the structured output; see `LlmResponse::tool_use`.
    pub async fn call_with_tool(
        &self,
        prompt: &str,
        system: &str,
        tool: ToolDefinition<'_>,
    ) -> Result<LlmResponse, LlmError> {
        let tool_name = tool.name;
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            tools: [tool],
            tool_choice: ToolChoice {
                choice_type: "tool",
                name: tool_name,
            },
        };
        self.send(&request_body).await
    }

    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff,
    /// up to `max_attempts` requests in total.
    async fn send(&self, request_body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            if llm_response.content.is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: self.max_attempts,
        }))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_tool_use_block_is_found_by_name() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "Here you go"},
                {"type": "tool_use", "id": "toolu_01", "name": "final_result",
                 "input": {"job_title": "data engineer", "skills": []}}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        let block = response.tool_use("final_result").unwrap();
        assert_eq!(block.id.as_deref(), Some("toolu_01"));
        assert_eq!(block.input.as_ref().unwrap()["job_title"], "data engineer");
        assert!(response.tool_use("other_tool").is_none());
        assert_eq!(response.text(), Some("Here you go"));
    }

    #[test]
    fn test_forced_tool_request_serializes_tool_choice() {
        let schema = serde_json::json!({"type": "object"});
        let request = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hi",
            }],
            tools: [ToolDefinition {
                name: "final_result",
                description: "d",
                input_schema: &schema,
            }],
            tool_choice: ToolChoice {
                choice_type: "tool",
                name: "final_result",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tool_choice"]["type"], "tool");
        assert_eq!(value["tool_choice"]["name"], "final_result");
        assert_eq!(value["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_max_attempts_never_drops_below_one() {
        let client = LlmClient::new("sk-test".to_string()).unwrap();
        assert_eq!(client.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(client.clone().with_max_attempts(0).max_attempts, 1);
        assert_eq!(client.with_max_attempts(2).max_attempts, 2);
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }
}
