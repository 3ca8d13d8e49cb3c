use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AddLeadResponse {
    pub lead_score: u32,
}

/// POST /add_lead
pub async fn handle_add_lead(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<AddLeadResponse>), AppError> {
    let mut lead: Map<String, Value> = match body {
        Some(Json(Value::Object(map))) if !map.is_empty() => map,
        _ => return Err(AppError::Validation("Invalid data".to_string())),
    };

    let lead_score = state.lead_scorer.score(&lead).await?;
    lead.insert("lead_score".to_string(), Value::from(lead_score));
    let stored = state.leads.insert(lead)?;

    info!(
        lead_score,
        backend = state.lead_scorer.backend(),
        stored,
        "lead added"
    );
    Ok((StatusCode::CREATED, Json(AddLeadResponse { lead_score })))
}

/// GET /get_leads
pub async fn handle_get_leads(
    State(state): State<AppState>,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    Ok(Json(state.leads.all()?))
}
