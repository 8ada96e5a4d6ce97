// Extraction pipeline: HTML cleanup, prompt building, model calls, interaction
// logs and the parser that turns those logs back into a skill table.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod extractor;
pub mod html;
pub mod interaction_log;
pub mod log_parser;
pub mod prompt;
pub mod prompts;
