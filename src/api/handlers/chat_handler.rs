use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
    llm::ChatMode,
    services::ChatRequest,
};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }
    if request.top_k == 0 {
        return Err(AppError::Validation("top_k must be at least 1".to_string()));
    }

    debug!(
        "Chat request: session_id={:?}, include_context={}, top_k={}, mode={}",
        request.session_id, request.include_context, request.top_k, request.mode
    );

    let outcome = state
        .chat_service
        .chat(ChatRequest {
            query: request.message,
            session_id: request.session_id,
            include_context: request.include_context,
            top_k: request.top_k,
            mode: ChatMode::parse(&request.mode),
            temperature: request.temperature,
        })
        .await;

    Ok(Json(ChatApiResponse {
        success: outcome.success,
        response: outcome.response,
        session_id: outcome.session_id,
        processing_time: outcome.processing_time,
        context_used: outcome.context_used,
        error: outcome.error,
    }))
}
