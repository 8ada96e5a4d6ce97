use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clustering::{ClusterError, EmbedError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Cluster(ClusterError::Embed(EmbedError::Unavailable(reason))) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "EMBEDDINGS_UNAVAILABLE",
                reason.clone(),
            ),
            AppError::Cluster(ClusterError::Embed(e)) => {
                tracing::error!("Embedding error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_ERROR",
                    "The embedding service failed".to_string(),
                )
            }
            AppError::Cluster(e) => {
                tracing::error!("Clustering error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CLUSTERING_ERROR",
                    "Skills could not be clustered".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
