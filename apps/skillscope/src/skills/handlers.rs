use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::clustering::{build_dendrogram, SkillDendrogram};
use crate::errors::AppError;
use crate::jobs::filtered_titles;
use crate::models::skill::SkillRow;
use crate::routes::JobFilterQuery;
use crate::skills::table::SkillTable;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SkillsResponse {
    pub job_titles: Vec<String>,
    pub rows: Vec<SkillRow>,
}

/// Every requested title must exist in the table; an empty selection is always valid.
fn check_titles(table: &SkillTable, titles: &[String]) -> Result<(), AppError> {
    let known = table.job_titles();
    let unknown: Vec<&str> = titles
        .iter()
        .map(|t| t.as_str())
        .filter(|t| !known.iter().any(|k| k.eq_ignore_ascii_case(t)))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "No extracted skills for job title(s): {}",
            unknown.join(", ")
        )))
    }
}

/// Job titles the skill views cover: the explicit selection, narrowed to the
/// titles of postings that pass the company, location and schedule filters.
/// `None` when those filters leave no posting.
fn selected_titles(state: &AppState, params: &JobFilterQuery) -> Result<Option<Vec<String>>, AppError> {
    let filter = params.filter();
    check_titles(&state.skills, &filter.job_titles)?;
    if !filter.narrows_beyond_titles() {
        return Ok(Some(filter.job_titles));
    }
    let titles = filtered_titles(&state.jobs, &filter);
    Ok((!titles.is_empty()).then_some(titles))
}

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(params): Query<JobFilterQuery>,
) -> Result<Json<SkillsResponse>, AppError> {
    let Some(titles) = selected_titles(&state, &params)? else {
        return Ok(Json(SkillsResponse {
            job_titles: Vec::new(),
            rows: Vec::new(),
        }));
    };
    let rows = state.skills.for_job_titles(&titles).cloned().collect();
    Ok(Json(SkillsResponse {
        job_titles: titles,
        rows,
    }))
}

/// GET /api/v1/skills/dendrogram
pub async fn handle_skill_dendrogram(
    State(state): State<AppState>,
    Query(params): Query<JobFilterQuery>,
) -> Result<Json<SkillDendrogram>, AppError> {
    let labels = match selected_titles(&state, &params)? {
        Some(titles) => state.skills.distinct_skills(&titles),
        None => Vec::new(),
    };
    let dendrogram = build_dendrogram(state.embedder.as_ref(), labels).await?;
    Ok(Json(dendrogram))
}
