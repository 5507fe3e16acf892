//! 可观测性模块
//!
//! 提供健康检查与 Prometheus 文本格式指标。

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::app_state::AppState;

// ===== Simple Metrics (using atomics for zero-dep implementation) =====

/// 简单应用指标
#[derive(Clone, Default)]
pub struct AppMetrics {
    pub chat_requests_total: Arc<AtomicU64>,
    pub fallback_responses_total: Arc<AtomicU64>,
    pub search_requests_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
}

impl AppMetrics {
    /// 记录对话请求
    pub fn record_chat_request(&self) {
        self.chat_requests_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录回退答复
    pub fn record_fallback(&self) {
        self.fallback_responses_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录检索请求
    pub fn record_search(&self) {
        self.search_requests_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录错误
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        format!(
            r#"# HELP chat_requests_total Total chat requests
# TYPE chat_requests_total counter
chat_requests_total {}
# HELP fallback_responses_total Chat requests answered with the fallback text
# TYPE fallback_responses_total counter
fallback_responses_total {}
# HELP search_requests_total Total context retrieval requests
# TYPE search_requests_total counter
search_requests_total {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            self.chat_requests_total.load(Ordering::SeqCst),
            self.fallback_responses_total.load(Ordering::SeqCst),
            self.search_requests_total.load(Ordering::SeqCst),
            self.errors_total.load(Ordering::SeqCst),
        )
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// 服务状态
    pub status: String,
    /// 检查时间
    pub timestamp: DateTime<Utc>,
    /// 版本号
    pub version: String,
    /// 各子服务状态
    pub services: ServiceReadiness,
}

/// 子服务就绪状态
#[derive(Debug, Serialize)]
pub struct ServiceReadiness {
    /// 向量索引是否已初始化
    pub index_ready: bool,
    /// 已索引文档数量
    pub indexed_documents: usize,
    /// 知识库文档数量
    pub knowledge_documents: usize,
    /// 活跃会话数量
    pub active_sessions: usize,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let index_ready = state.index.is_ready().await;
    let status = if index_ready { "ok" } else { "initializing" };

    Json(HealthStatus {
        status: status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceReadiness {
            index_ready,
            indexed_documents: state.index.len().await,
            knowledge_documents: state.knowledge.documents().len(),
            active_sessions: state.memory.active_sessions(),
        },
    })
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.gather()
}

/// 创建可观测性路由（/health 与 /metrics）
pub fn create_observability_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_gather_format() {
        let metrics = AppMetrics::default();
        metrics.record_chat_request();
        metrics.record_chat_request();
        metrics.record_fallback();

        let rendered = metrics.gather();
        assert!(rendered.contains("chat_requests_total 2"));
        assert!(rendered.contains("fallback_responses_total 1"));
        assert!(rendered.contains("errors_total 0"));
    }
}
