use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus the size of the loaded tables.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillscope-api",
        "skill_rows": state.skills.len(),
        "jobs": state.jobs.len(),
        "embedding_model": state.embedder.model_name(),
    }))
}
