//! 会话消息模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 消息角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 用户消息
    User,
    /// 助手消息
    Assistant,
}

impl Role {
    /// 提示词中使用的标签
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// 会话消息
///
/// 归属于唯一会话的滑动窗口历史。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    /// 消息角色
    pub role: Role,
    /// 消息内容
    pub content: String,
    /// 消息时间
    pub timestamp: DateTime<Utc>,
    /// 元数据
    pub metadata: HashMap<String, String>,
}

impl SessionMessage {
    /// 创建新消息
    pub fn new(role: Role, content: &str, metadata: HashMap<String, String>) -> Self {
        Self {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// 分析记录
///
/// 追加到无界日志，独立于会话历史的生命周期，会话清除后仍保留。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    /// 会话 ID
    pub session_id: String,
    /// 消息角色
    pub role: Role,
    /// 消息内容
    pub content: String,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
    /// 本次使用的上下文文档数量
    pub context_used: usize,
    /// 处理耗时（秒）
    pub processing_time: Option<f64>,
    /// 元数据
    pub metadata: HashMap<String, String>,
}
