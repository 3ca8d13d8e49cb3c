use axum::{
    extract::{Query, State},
    Json,
};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::ranking::mapper::FEATURE_LABELS;
use crate::ranking::models::{LeadRecord, ModelMetrics, RankingResponse};
use crate::ranking::pipeline::rank_leads;
use crate::ranking::policy::ScoringPolicy;
use crate::ranking::RankingError;
use crate::state::AppState;

/// Query string of `POST /rank_customers`. `policy` takes any name
/// `ScoringPolicy::from_str` accepts.
#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    pub policy: Option<String>,
}

impl RankQuery {
    /// The requested policy, or `fallback` when none was given.
    pub fn policy_or(&self, fallback: ScoringPolicy) -> Result<ScoringPolicy, AppError> {
        match self.policy.as_deref() {
            None => Ok(fallback),
            Some(raw) => raw.parse().map_err(AppError::Validation),
        }
    }
}

/// Decodes the request body into a batch of leads.
///
/// Absent body, `null`, `[]` and `{}` mean "no data". Anything else that is
/// not an array of objects fails the whole batch.
pub fn parse_batch(body: &[u8]) -> Result<Vec<LeadRecord>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RankingError::EmptyBatch.into());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Malformed JSON body: {e}")))?;

    let items = match value {
        Value::Null => return Err(RankingError::EmptyBatch.into()),
        Value::Array(items) => items,
        Value::Object(map) if map.is_empty() => return Err(RankingError::EmptyBatch.into()),
        Value::Object(_) => return Err(RankingError::NotABatch("an object").into()),
        Value::String(_) => return Err(RankingError::NotABatch("a string").into()),
        Value::Number(_) => return Err(RankingError::NotABatch("a number").into()),
        Value::Bool(_) => return Err(RankingError::NotABatch("a boolean").into()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(RankingError::MalformedRecord {
                    index,
                    source: serde::de::Error::custom(format!("found {item}")),
                });
            }
            serde_json::from_value(item)
                .map_err(|source| RankingError::MalformedRecord { index, source })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)
}

fn rank_with(
    state: &AppState,
    body: &[u8],
    policy: ScoringPolicy,
) -> Result<Json<RankingResponse>, AppError> {
    let leads = parse_batch(body)?;
    let now = Utc::now();
    let rankings = rank_leads(&leads, policy, &state.scales, now)?;

    info!(
        leads = leads.len(),
        policy = %policy,
        normalizer = %state.scales.mode(),
        "ranked customers"
    );

    Ok(Json(RankingResponse {
        success: true,
        model_metrics: ModelMetrics {
            total_customers: leads.len(),
            features_used: FEATURE_LABELS.to_vec(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            scoring_policy: policy,
            normalizer_mode: state.scales.mode(),
        },
        rankings,
    }))
}

/// POST /rank_customers
pub async fn handle_rank_customers(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
    body: Bytes,
) -> Result<Json<RankingResponse>, AppError> {
    let policy = query.policy_or(state.config.scoring_policy)?;
    rank_with(&state, &body, policy)
}

/// POST /calculate_likelihood
pub async fn handle_calculate_likelihood(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RankingResponse>, AppError> {
    rank_with(&state, &body, ScoringPolicy::Probabilistic)
}
