// All LLM prompt constants for the extraction module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Name of the structured output tool the extraction agent is forced to call.
pub const OUTPUT_TOOL_NAME: &str = "final_result";

/// Name of the structured output schema, recorded for traceability.
pub const OUTPUT_SCHEMA_NAME: &str = "SkillsList";

pub const OUTPUT_TOOL_DESCRIPTION: &str =
    "The final response which ends this conversation. \
    `skills` holds one JSON-serialized object per extracted skill.";

/// Skill extraction prompt template. Replace `{job_title}` and `{description}` before sending.
///
/// The task lines are a contract with the log parser: field names and the
/// 5-10 bounds must stay verbatim.
pub const SKILL_EXTRACTION_PROMPT_TEMPLATE: &str = r#"JOB_TITLE: "{job_title}"

TEXT:
"""{description}"""

YOUR TASK:
- Extract skills that are explicitly present. No guesses. Be specific. For example, SQL and Python are skills.
- Extract between 5 to 10 skills.
- Extract between 5 to 10 technologies required.
- For each skill, include: skill name, category include hard or soft, types of tools or technologies mentioned, evidence (verbatim phrase), confidence between 0 and 1. Be strict with this instruction.
- Return each skill as a JSON object with the keys "skill_name", "category", "types_of_tools_or_technologies", "evidence", "confidence".
- Please provide an answer. No answer is not an option."#;
