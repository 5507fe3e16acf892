use axum::{Json, extract::State, response::IntoResponse};
use tracing::{debug, info};

use crate::{
    api::{app_state::AppState, dto::stats_dto::*},
    error::AppError,
};

pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Collecting service statistics");

    Ok(Json(StatsResponse {
        active_sessions: state.memory.active_sessions(),
        index_ready: state.index.is_ready().await,
        indexed_documents: state.index.len().await,
        knowledge: state.knowledge.statistics(),
        analytics: state.memory.analytics_summary(),
    }))
}

pub async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    info!("Explicit index rebuild requested");

    state.index.rebuild(state.knowledge.documents()).await?;
    let indexed_documents = state.index.len().await;

    Ok(Json(RebuildResponse {
        indexed_documents,
        message: "Index rebuilt successfully".to_string(),
    }))
}
