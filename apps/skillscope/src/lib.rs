pub mod clustering;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod jobs;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod skills;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Structured logging for both binaries. `RUST_LOG` wins over the default,
/// which enables `default_level` for the library and for the calling binary
/// (pass its `env!("CARGO_CRATE_NAME")`).
pub fn init_tracing(bin_crate: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives(bin_crate, default_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directives(bin_crate: &str, level: &str) -> String {
    format!("{}={level},{bin_crate}={level}", env!("CARGO_CRATE_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_library_and_binary() {
        let directives = default_directives("extract_skills", "info");
        assert_eq!(directives, "skillscope=info,extract_skills=info");
        assert!(directives.parse::<EnvFilter>().is_ok());
    }
}
