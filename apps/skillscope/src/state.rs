use std::sync::Arc;

use crate::clustering::Embedder;
use crate::models::job::JobRecord;
use crate::skills::table::SkillTable;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Parsed and normalized once at startup.
    pub skills: Arc<SkillTable>,
    /// Normalized job postings; empty when no jobs file is configured.
    pub jobs: Arc<Vec<JobRecord>>,
    pub embedder: Arc<dyn Embedder>,
}
