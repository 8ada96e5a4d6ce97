//! Prompt Builder — one extraction prompt per job record.

use std::fmt;

use crate::extraction::html::html_to_text;
use crate::extraction::prompts::SKILL_EXTRACTION_PROMPT_TEMPLATE;
use crate::models::job::JobRecord;

/// A fully composed extraction prompt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrompt {
    job_title: String,
    text: String,
    has_description: bool,
}

impl ExtractionPrompt {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The job title embedded in the prompt; used to attribute failures in logs.
    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    /// False when the cleaned description was empty; such a prompt has nothing to extract from.
    pub fn has_description(&self) -> bool {
        self.has_description
    }
}

impl fmt::Display for ExtractionPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds the prompt for a single job.
///
/// Missing `title_cleaned` or `description` leave an empty segment in the
/// template; the record is never rejected here.
pub fn build_prompt(job: &JobRecord) -> ExtractionPrompt {
    let job_title = job.title_cleaned.as_deref().unwrap_or("").trim().to_string();
    let description = job
        .description
        .as_deref()
        .map(html_to_text)
        .unwrap_or_default();

    // description first: the title placeholder precedes it in the template,
    // so a literal "{job_title}" inside a description is never substituted.
    let text = SKILL_EXTRACTION_PROMPT_TEMPLATE
        .replacen("{description}", &description, 1)
        .replacen("{job_title}", &job_title, 1);

    ExtractionPrompt {
        job_title,
        text,
        has_description: !description.is_empty(),
    }
}

pub fn build_prompts(jobs: &[JobRecord]) -> Vec<ExtractionPrompt> {
    jobs.iter().map(build_prompt).collect()
}
