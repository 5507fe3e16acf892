//! 对话 DTO
//!
//! 定义对话相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

/// 对话请求
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChatApiRequest {
    /// 用户问题
    pub message: String,
    /// 会话 ID，缺省时服务端生成
    pub session_id: Option<String>,
    /// 是否检索知识库上下文
    pub include_context: bool,
    /// 检索的文档数量
    pub top_k: usize,
    /// 对话模式: "default" | "business" | "education"
    pub mode: String,
    /// 采样温度
    pub temperature: Option<f32>,
}

impl Default for ChatApiRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            session_id: None,
            include_context: true,
            top_k: 3,
            mode: "default".to_string(),
            temperature: None,
        }
    }
}

/// 对话响应
#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    /// 请求是否被处理
    pub success: bool,
    /// 答复文本
    pub response: String,
    /// 会话 ID
    pub session_id: String,
    /// 处理耗时（秒）
    pub processing_time: f64,
    /// 本次使用的上下文文档数量
    pub context_used: usize,
    /// 错误消息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
