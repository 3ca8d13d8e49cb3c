use anyhow::{anyhow, Context, Result};

use crate::ranking::normalizer::NormalizerMode;
use crate::ranking::policy::ScoringPolicy;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is set to an invalid value.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub scoring_policy: ScoringPolicy,
    pub normalizer_mode: NormalizerMode,
    /// Enables the model-backed lead scorer when present.
    pub gemini_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scoring_policy: lookup("SCORING_POLICY")
                .unwrap_or_else(|| "additive".to_string())
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("SCORING_POLICY is invalid")?,
            normalizer_mode: lookup("NORMALIZER_MODE")
                .unwrap_or_else(|| "refit".to_string())
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("NORMALIZER_MODE is invalid")?,
            gemini_api_key: lookup("GEMINI_API_KEY")
                .or_else(|| lookup("GOOGLE_API_KEY"))
                .filter(|key| !key.trim().is_empty()),
        })
    }
}
