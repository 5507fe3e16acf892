use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

/// 知识库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// 存放 faqs.json / policies.json 的目录
    pub data_dir: PathBuf,
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding 后端类型: "ollama" 或 "hashing"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// 向量维度
    pub dimension: usize,
    /// 批处理大小
    pub batch_size: usize,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// Ollama 请求超时（秒）
    pub ollama_timeout: u64,
}

/// 向量索引配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    /// 索引快照文件路径
    pub snapshot_path: PathBuf,
}

/// 会话记忆配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemoryConfig {
    /// 每个会话保留的最大消息数
    pub max_messages: usize,
    /// 构建提示词时包含的最近消息数
    pub prompt_window: usize,
}

/// 生成服务配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat Completions 接口地址
    pub api_url: String,
    /// API 密钥（空串视为未配置）
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 最大输出 Token 数
    pub max_tokens: u32,
    /// 默认采样温度
    pub temperature: f32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 知识库配置
    pub knowledge: KnowledgeConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 向量索引配置
    pub index: IndexConfig,
    /// 会话记忆配置
    pub memory: MemoryConfig,
    /// 生成服务配置
    pub llm: LlmConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
            },
            knowledge: KnowledgeConfig {
                data_dir: PathBuf::from("./data"),
            },
            embedding: EmbeddingConfig {
                backend: "hashing".into(),
                model_name: "hashing-bow".into(),
                dimension: 384,
                batch_size: 32,
                ollama_url: "http://localhost:11434".into(),
                ollama_timeout: 60,
            },
            index: IndexConfig {
                snapshot_path: PathBuf::from("./data/index/snapshot.json"),
            },
            memory: MemoryConfig {
                max_messages: 10,
                prompt_window: 5,
            },
            llm: LlmConfig {
                api_url: "https://api.groq.com/openai/v1/chat/completions".into(),
                api_key: String::new(),
                model: "llama-3.3-70b-versatile".into(),
                timeout: 30,
                max_tokens: 500,
                temperature: 0.4,
            },
            logging: LoggingConfig {
                level: "debug".into(),
            },
            app_name: "broca".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config
    }
}
