use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use skillscope::clustering::embeddings::{OpenAiEmbedder, UnavailableEmbedder};
use skillscope::clustering::Embedder;
use skillscope::config::Config;
use skillscope::jobs::{load_jobs, normalize_jobs};
use skillscope::routes::build_router;
use skillscope::skills::load_synonyms;
use skillscope::skills::table::SkillTable;
use skillscope::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    skillscope::init_tracing(env!("CARGO_CRATE_NAME"), &config.rust_log);

    info!("Starting skillscope API v{}", env!("CARGO_PKG_VERSION"));

    let synonyms = load_synonyms(config.skill_synonyms_path.as_deref())
        .context("Failed to load the skill synonym table")?;

    // Parsed and normalized once; restart to pick up new extraction logs.
    let skills = SkillTable::from_logs(&config.logs_directory, &synonyms).with_context(|| {
        format!(
            "Failed to read interaction logs from {}",
            config.logs_directory.display()
        )
    })?;
    info!(
        "Skill table ready: {} rows across {} job titles",
        skills.len(),
        skills.job_titles().len()
    );

    let jobs = match &config.jobs_path {
        Some(path) => {
            let mut jobs = load_jobs(path)?;
            normalize_jobs(&mut jobs);
            jobs
        }
        None => {
            warn!("JOBS_PATH is not set; job aggregates will be empty");
            Vec::new()
        }
    };

    let embedder: Arc<dyn Embedder> = match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiEmbedder::new(key.clone())?),
        None => {
            warn!("OPENAI_API_KEY is not set; dendrograms are unavailable");
            Arc::new(UnavailableEmbedder::new("OPENAI_API_KEY is not set"))
        }
    };
    info!("Embedding model: {}", embedder.model_name());

    let state = AppState {
        skills: Arc::new(skills),
        jobs: Arc::new(jobs),
        embedder,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
