mod config;
mod errors;
mod intake;
mod llm_client;
mod ranking;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::intake::scorer::{LeadScorer, LlmLeadScorer, RuleBasedLeadScorer};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LeadRank API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Scoring policy: {}, normalizer mode: {}",
        config.scoring_policy, config.normalizer_mode
    );

    let lead_scorer: Arc<dyn LeadScorer> = match &config.gemini_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone()).context("Failed to build LLM client")?;
            info!("LLM lead scorer enabled (model: {})", llm_client::MODEL);
            Arc::new(LlmLeadScorer(llm))
        }
        None => {
            warn!("GEMINI_API_KEY not set, using rule-based lead scorer");
            Arc::new(RuleBasedLeadScorer)
        }
    };

    let state = AppState::new(config.clone(), lead_scorer);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    info!("Listening on {addr}");
    info!("POST /rank_customers - rank customers from a JSON array of leads");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
