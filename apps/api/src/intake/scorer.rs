//! Lead scorers for the intake surface.
//!
//! `AppState` holds an `Arc<dyn LeadScorer>`, chosen at startup: the model-backed
//! scorer when an API key is configured, the rule-based heuristic otherwise.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::intake::prompts::render_lead_prompt;
use crate::llm_client::LlmClient;

pub const MAX_LEAD_SCORE: u32 = 100;

#[async_trait]
pub trait LeadScorer: Send + Sync {
    /// Returns a lead score in 0..=100.
    async fn score(&self, lead: &Map<String, Value>) -> Result<u32, AppError>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

/// Pulls `"lead_score": N` out of free model text. No match scores 0.
pub fn extract_lead_score(text: &str) -> u32 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r#""lead_score"\s*:\s*(\d+)"#).expect("lead score pattern is valid")
    });
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        // Digits too long for u32 are certainly above the cap
        .map(|m| m.as_str().parse::<u32>().unwrap_or(MAX_LEAD_SCORE))
        .unwrap_or(0)
        .min(MAX_LEAD_SCORE)
}

pub struct LlmLeadScorer(pub LlmClient);

#[async_trait]
impl LeadScorer for LlmLeadScorer {
    async fn score(&self, lead: &Map<String, Value>) -> Result<u32, AppError> {
        let prompt = render_lead_prompt(lead);
        let reply = self.0.call_text(&prompt).await?;
        let score = extract_lead_score(&reply);
        debug!(reply = %reply, "model lead score reply");
        info!(score, "extracted lead score");
        Ok(score)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Offline heuristic: Tech industry +10, company size over 500 +5,
/// monthly budget over 50 +8.
pub struct RuleBasedLeadScorer;

fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl LeadScorer for RuleBasedLeadScorer {
    async fn score(&self, lead: &Map<String, Value>) -> Result<u32, AppError> {
        let mut score = 0;
        if lead.get("industry").and_then(Value::as_str) == Some("Tech") {
            score += 10;
        }
        if as_number(lead.get("company_size")).is_some_and(|size| size > 500.0) {
            score += 5;
        }
        if as_number(lead.get("monthly_budget")).is_some_and(|budget| budget > 50.0) {
            score += 8;
        }
        Ok(score)
    }

    fn backend(&self) -> &'static str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_lead_score() {
        assert_eq!(extract_lead_score(r#"{"lead_score": 72}"#), 72);
        assert_eq!(
            extract_lead_score("```json\n{\"lead_score\":\n  45}\n```"),
            45
        );
        assert_eq!(extract_lead_score("I think this lead is great"), 0);
        assert_eq!(extract_lead_score(r#"{"lead_score": "high"}"#), 0);
    }

    #[test]
    fn test_extract_lead_score_clamps() {
        assert_eq!(extract_lead_score(r#"{"lead_score": 250}"#), 100);
        assert_eq!(extract_lead_score(r#"{"lead_score": 99999999999999}"#), 100);
    }

    #[tokio::test]
    async fn test_rule_based_scorer() {
        let lead = json!({"industry": "Tech", "company_size": 800, "monthly_budget": "60"});
        let score = RuleBasedLeadScorer
            .score(lead.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(score, 23);

        let lead = json!({"industry": "Retail", "company_size": 500, "monthly_budget": 10});
        let score = RuleBasedLeadScorer
            .score(lead.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(score, 0);
    }

    #[tokio::test]
    async fn test_rule_based_scorer_ignores_missing_fields() {
        let score = RuleBasedLeadScorer.score(&Map::new()).await.unwrap();
        assert_eq!(score, 0);
    }
}
