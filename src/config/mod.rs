//! 配置模块

pub mod config;
pub mod loader;

pub use config::{
    AppConfig, EmbeddingConfig, IndexConfig, KnowledgeConfig, LlmConfig, LoggingConfig,
    MemoryConfig, ServerConfig,
};
pub use loader::ConfigLoader;
