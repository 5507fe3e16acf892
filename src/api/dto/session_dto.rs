//! 会话 DTO
//!
//! 定义会话相关的响应数据结构。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::memory::{SessionExport, SessionStats};
use crate::models::SessionMessage;

/// 会话消息响应
#[derive(Debug, Serialize)]
pub struct SessionMessageResponse {
    /// 消息角色
    pub role: String,
    /// 消息内容
    pub content: String,
    /// 消息时间
    pub timestamp: DateTime<Utc>,
    /// 元数据
    pub metadata: HashMap<String, String>,
}

impl From<SessionMessage> for SessionMessageResponse {
    fn from(message: SessionMessage) -> Self {
        Self {
            role: message.role.label().to_lowercase(),
            content: message.content,
            timestamp: message.timestamp,
            metadata: message.metadata,
        }
    }
}

/// 会话历史响应
#[derive(Debug, Serialize)]
pub struct SessionHistoryResponse {
    /// 会话 ID
    pub session_id: String,
    /// 消息序列（时间顺序）
    pub messages: Vec<SessionMessageResponse>,
}

/// 会话统计响应
#[derive(Debug, Serialize)]
pub struct SessionStatsResponse {
    /// 会话 ID
    pub session_id: String,
    /// 消息总数
    pub total_messages: usize,
    /// 用户消息数
    pub user_messages: usize,
    /// 助手消息数
    pub assistant_messages: usize,
    /// 首条消息时间
    pub session_start: Option<DateTime<Utc>>,
    /// 会话时长（秒）
    pub duration_seconds: f64,
}

impl SessionStatsResponse {
    pub fn from_stats(session_id: &str, stats: SessionStats) -> Self {
        Self {
            session_id: session_id.to_string(),
            total_messages: stats.total_messages,
            user_messages: stats.user_messages,
            assistant_messages: stats.assistant_messages,
            session_start: stats.session_start,
            duration_seconds: stats.duration_seconds,
        }
    }
}

/// 会话导出响应
#[derive(Debug, Serialize)]
pub struct SessionExportResponse {
    /// 会话 ID
    pub session_id: String,
    /// 全量历史
    pub messages: Vec<SessionMessageResponse>,
    /// 统计信息
    pub stats: SessionStatsResponse,
}

impl From<SessionExport> for SessionExportResponse {
    fn from(export: SessionExport) -> Self {
        let stats = SessionStatsResponse::from_stats(&export.session_id, export.stats);
        Self {
            session_id: export.session_id,
            messages: export.messages.into_iter().map(Into::into).collect(),
            stats,
        }
    }
}

/// 删除会话响应
#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    /// 会话 ID
    pub id: String,
    /// 消息
    pub message: String,
}
