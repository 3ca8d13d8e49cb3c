pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::intake::handlers as intake;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking
        .route("/rank_customers", post(ranking::handle_rank_customers))
        .route(
            "/calculate_likelihood",
            post(ranking::handle_calculate_likelihood),
        )
        // Lead intake
        .route("/add_lead", post(intake::handle_add_lead))
        .route("/get_leads", get(intake::handle_get_leads))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
