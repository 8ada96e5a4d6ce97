use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// API keys are optional here; each binary requires the ones it uses.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub logs_directory: PathBuf,
    pub jobs_path: Option<PathBuf>,
    pub skill_synonyms_path: Option<PathBuf>,
    pub extraction_timeout: Duration,
    pub extraction_max_attempts: u32,
    pub agent_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            logs_directory: non_empty("LOGS_DIRECTORY")
                .unwrap_or_else(|| "logs".to_string())
                .into(),
            jobs_path: non_empty("JOBS_PATH").map(PathBuf::from),
            skill_synonyms_path: non_empty("SKILL_SYNONYMS_PATH").map(PathBuf::from),
            extraction_timeout: Duration::from_secs(
                non_empty("EXTRACTION_TIMEOUT_SECS")
                    .unwrap_or_else(|| "90".to_string())
                    .parse::<u64>()
                    .context("EXTRACTION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            extraction_max_attempts: non_empty("EXTRACTION_MAX_ATTEMPTS")
                .unwrap_or_else(|| "1".to_string())
                .parse::<u32>()
                .context("EXTRACTION_MAX_ATTEMPTS must be a positive integer")?
                .max(1),
            agent_name: non_empty("AGENT_NAME").unwrap_or_else(|| "skills_extractor".to_string()),
            port: non_empty("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn require_anthropic_key(&self) -> Result<&str> {
        require(&self.anthropic_api_key, "ANTHROPIC_API_KEY")
    }

    pub fn require_jobs_path(&self) -> Result<&PathBuf> {
        self.jobs_path
            .as_ref()
            .context("Required environment variable 'JOBS_PATH' is not set")
    }
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.logs_directory, PathBuf::from("logs"));
        assert_eq!(config.extraction_timeout, Duration::from_secs(90));
        assert_eq!(config.extraction_max_attempts, 1);
        assert_eq!(config.agent_name, "skills_extractor");
        assert_eq!(config.port, 8080);
        assert!(config.anthropic_api_key.is_none());
        assert!(config.require_anthropic_key().is_err());
        assert!(config.require_jobs_path().is_err());
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = config(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("OPENAI_API_KEY", "  "),
            ("LOGS_DIRECTORY", "/tmp/skill-logs"),
            ("EXTRACTION_TIMEOUT_SECS", "5"),
            ("EXTRACTION_MAX_ATTEMPTS", "0"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.require_anthropic_key().unwrap(), "sk-ant-test");
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.logs_directory, PathBuf::from("/tmp/skill-logs"));
        assert_eq!(config.extraction_timeout, Duration::from_secs(5));
        assert_eq!(config.extraction_max_attempts, 1);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config(&[("PORT", "not-a-port")]).is_err());
        assert!(config(&[("EXTRACTION_TIMEOUT_SECS", "-1")]).is_err());
    }
}
