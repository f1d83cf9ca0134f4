pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat;
use crate::dataset;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Aggregation View
        .route("/api/years", get(dataset::handlers::handle_year_aggregates))
        .route(
            "/api/years/:year/jobs",
            get(dataset::handlers::handle_job_title_aggregates),
        )
        // Similarity Query Service
        .route("/api/chat", post(chat::handlers::handle_chat))
        .with_state(state)
}
