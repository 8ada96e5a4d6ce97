// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that keeps the model inside the supplied text.
pub const GROUNDED_EXTRACTION_SYSTEM: &str = "You are an information extraction expert. \
    Extract only what is explicitly supported by the provided text. \
    Do NOT infer, interpolate, or invent details.";

/// Appended to system prompts whenever the answer must come back through a tool call.
pub const TOOL_ONLY_INSTRUCTION: &str = "Return your answer ONLY by calling the provided tool. \
    Do NOT answer in plain text.";
