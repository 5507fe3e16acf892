//! 服务模块

pub mod chat;

pub use chat::{ChatOutcome, ChatRequest, ChatService, create_chat_service};
