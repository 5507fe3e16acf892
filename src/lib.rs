//! Broca - 检索增强对话问答服务
//!
//! 将 FAQ/政策知识库的向量检索、滑动窗口会话记忆与外部大模型补全服务
//! 编排为一次请求/响应循环，生成失败时降级为确定性回退答案。

pub mod api;
pub mod config;
pub mod error;
pub mod index;
pub mod knowledge;
pub mod llm;
pub mod memory;
pub mod models;
pub mod observability;
pub mod services;
