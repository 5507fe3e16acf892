//! API 模块
//!
//! 提供 REST API 支持。路由层不承载业务逻辑，处理器只做 DTO 转换
//! 并委托给服务对象。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::observability::create_observability_router;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::chat_routes::create_chat_router())
        .merge(routes::session_routes::create_session_router())
        .merge(routes::stats_routes::create_stats_router());

    Router::new()
        .nest("/api/v1", api)
        .merge(create_observability_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
