//! Axum route handler for the chat endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::chat::reply::format_reply;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/chat
///
/// Embeds the message, ranks every dataset record by cosine similarity and
/// replies with the closest one. The whole computation is bounded by the
/// configured chat timeout.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::Validation(format!("invalid chat request: {}", rejection.body_text()))
    })?;
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    async move {
        info!(
            "Chat request received ({} chars)",
            request.message.chars().count()
        );

        let timeout = state.config.chat_timeout;
        let best = tokio::time::timeout(
            timeout,
            state
                .matcher
                .find_best_match(&request.message, state.dataset.records()),
        )
        .await
        .map_err(|_| AppError::Timeout(timeout))??;

        Ok::<_, AppError>(Json(ChatResponse {
            reply: format_reply(best),
        }))
    }
    .instrument(span)
    .await
}
