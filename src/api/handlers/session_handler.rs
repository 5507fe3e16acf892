use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::session_dto::*},
    error::AppError,
};

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting session history: {}", id);

    if !state.memory.contains_session(&id) {
        return Err(AppError::NotFound(format!("Session not found: {}", id)));
    }

    let messages = state
        .memory
        .get_history(&id)
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(SessionHistoryResponse {
        session_id: id,
        messages,
    }))
}

pub async fn get_session_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting session stats: {}", id);

    // 未知会话返回零值统计，不报错
    let stats = state.memory.session_stats(&id);
    Ok(Json(SessionStatsResponse::from_stats(&id, stats)))
}

pub async fn export_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Exporting session: {}", id);

    if !state.memory.contains_session(&id) {
        return Err(AppError::NotFound(format!("Session not found: {}", id)));
    }

    let export = state.memory.export_session(&id);
    Ok(Json(SessionExportResponse::from(export)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Clearing session: {}", id);

    // 幂等：未知会话也返回成功
    state.memory.clear_session(&id);

    Ok(Json(DeleteSessionResponse {
        id,
        message: "Session cleared successfully".to_string(),
    }))
}
