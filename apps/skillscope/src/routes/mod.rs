pub mod health;

use axum::{routing::get, Router};
use serde::Deserialize;

use crate::jobs::handlers as jobs;
use crate::jobs::JobFilter;
use crate::skills::handlers as skills;
use crate::state::AppState;

/// `?job_titles=data engineer,data analyst&location=ghent&company=acme&schedule=full-time`.
/// Each parameter is a comma list; missing or blank means no restriction.
#[derive(Debug, Default, Deserialize)]
pub struct JobFilterQuery {
    pub job_titles: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub schedule: Option<String>,
}

impl JobFilterQuery {
    pub fn titles(&self) -> Vec<String> {
        comma_list(self.job_titles.as_deref())
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            job_titles: self.titles(),
            companies: comma_list(self.company.as_deref()),
            locations: comma_list(self.location.as_deref()),
            schedules: comma_list(self.schedule.as_deref()),
        }
    }
}

fn comma_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/skills", get(skills::handle_list_skills))
        .route(
            "/api/v1/skills/dendrogram",
            get(skills::handle_skill_dendrogram),
        )
        .route("/api/v1/jobs/frequency", get(jobs::handle_job_frequency))
        .route("/api/v1/jobs/companies", get(jobs::handle_company_counts))
        .with_state(state)
}
