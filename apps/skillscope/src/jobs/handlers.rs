use axum::{
    extract::{Query, State},
    Json,
};

use crate::jobs::{company_counts, job_frequency, select_jobs, CompanyCount, TitleFrequency};
use crate::routes::JobFilterQuery;
use crate::state::AppState;

/// GET /api/v1/jobs/frequency
pub async fn handle_job_frequency(
    State(state): State<AppState>,
    Query(params): Query<JobFilterQuery>,
) -> Json<Vec<TitleFrequency>> {
    let filter = params.filter();
    Json(job_frequency(select_jobs(&state.jobs, &filter)))
}

/// GET /api/v1/jobs/companies
pub async fn handle_company_counts(
    State(state): State<AppState>,
    Query(params): Query<JobFilterQuery>,
) -> Json<Vec<CompanyCount>> {
    let filter = params.filter();
    Json(company_counts(select_jobs(&state.jobs, &filter)))
}
