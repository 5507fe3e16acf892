//! DTO 模块
//!
//! 定义 REST API 的请求和响应数据结构。

pub mod chat_dto;
pub mod session_dto;
pub mod stats_dto;
