use std::sync::Arc;

use crate::config::Config;
use crate::intake::scorer::LeadScorer;
use crate::intake::store::LeadStore;
use crate::ranking::normalizer::ScaleStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Normalization statistics. Refit per batch unless NORMALIZER_MODE=cached.
    pub scales: Arc<ScaleStore>,
    /// Pluggable intake scorer. LlmLeadScorer when an API key is set, else RuleBasedLeadScorer.
    pub lead_scorer: Arc<dyn LeadScorer>,
    pub leads: LeadStore,
}

impl AppState {
    pub fn new(config: Config, lead_scorer: Arc<dyn LeadScorer>) -> Self {
        Self {
            scales: Arc::new(ScaleStore::new(config.normalizer_mode)),
            config,
            lead_scorer,
            leads: LeadStore::default(),
        }
    }
}
