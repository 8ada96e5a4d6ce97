//! Batch driver: extract skills from job postings, or turn the interaction
//! logs back into a normalized skill table.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use skillscope::config::Config;
use skillscope::extraction::extractor::{LlmExtractionAgent, SkillExtractor};
use skillscope::extraction::interaction_log::InteractionLogger;
use skillscope::jobs::{load_jobs, normalize_jobs};
use skillscope::llm_client::LlmClient;
use skillscope::skills::load_synonyms;
use skillscope::skills::table::SkillTable;

#[derive(Parser)]
#[command(name = "extract-skills")]
#[command(about = "Extract required skills from job postings with an LLM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one extraction call per job and write an interaction log for each
    Extract {
        /// JSON array of job postings (defaults to JOBS_PATH)
        #[arg(short, long)]
        jobs: Option<PathBuf>,
        /// Log directory (defaults to LOGS_DIRECTORY)
        #[arg(short, long)]
        logs: Option<PathBuf>,
    },
    /// Parse the interaction logs into a normalized skill table
    Parse {
        /// Log directory (defaults to LOGS_DIRECTORY)
        #[arg(short, long)]
        logs: Option<PathBuf>,
        /// Write the table here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    skillscope::init_tracing(env!("CARGO_CRATE_NAME"), &config.rust_log);

    match cli.command {
        Commands::Extract { jobs, logs } => run_extract(&config, jobs, logs).await,
        Commands::Parse { logs, output } => run_parse(&config, logs, output),
    }
}

async fn run_extract(config: &Config, jobs: Option<PathBuf>, logs: Option<PathBuf>) -> Result<()> {
    // Environment problems stop the run before any job is sent.
    let api_key = config.require_anthropic_key()?.to_string();
    let jobs_path = match jobs {
        Some(path) => path,
        None => config.require_jobs_path()?.clone(),
    };
    let log_dir = logs.unwrap_or_else(|| config.logs_directory.clone());

    let mut jobs = load_jobs(&jobs_path)?;
    normalize_jobs(&mut jobs);

    let llm = LlmClient::new(api_key)?.with_max_attempts(config.extraction_max_attempts);
    let agent = Arc::new(LlmExtractionAgent::new(config.agent_name.clone(), llm));
    let logger = InteractionLogger::new(&log_dir)
        .with_context(|| format!("Cannot use log directory {}", log_dir.display()))?;
    let extractor = SkillExtractor::new(agent, logger, config.extraction_timeout);

    info!(
        "Extracting skills from {} jobs into {}",
        jobs.len(),
        log_dir.display()
    );
    let report = extractor.run_batch(&jobs).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_parse(config: &Config, logs: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let log_dir = logs.unwrap_or_else(|| config.logs_directory.clone());
    let synonyms = load_synonyms(config.skill_synonyms_path.as_deref())?;
    let table = SkillTable::from_logs(&log_dir, &synonyms)?;

    let json = serde_json::to_string_pretty(table.rows())?;
    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write skill table to {}", path.display()))?;
            info!("Wrote {} skill rows to {}", table.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
