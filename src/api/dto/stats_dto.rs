//! 统计 DTO
//!
//! 定义服务统计相关的响应数据结构。

use serde::Serialize;

use crate::knowledge::KnowledgeStatistics;
use crate::memory::AnalyticsSummary;

/// 服务统计响应
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// 活跃会话数量
    pub active_sessions: usize,
    /// 向量索引是否就绪
    pub index_ready: bool,
    /// 已索引文档数量
    pub indexed_documents: usize,
    /// 知识库统计
    pub knowledge: KnowledgeStatistics,
    /// 全局分析汇总
    pub analytics: AnalyticsSummary,
}

/// 索引重建响应
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    /// 重建后的文档数量
    pub indexed_documents: usize,
    /// 消息
    pub message: String,
}
