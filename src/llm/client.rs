//! 生成服务客户端
//!
//! 通过 OpenAI 兼容的 Chat Completions 接口调用外部补全服务，
//! 单次尝试、有界超时，失败按类别归入 [`GenerationError`]。

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::error::AppError;

/// 生成失败的分类
#[derive(Error, Debug)]
pub enum GenerationError {
    /// 未配置 API 密钥
    #[error("API key not configured")]
    Unconfigured,

    /// 请求超时
    #[error("completion request timed out")]
    Timeout,

    /// 服务端返回错误状态
    #[error("completion service error {status}: {body}")]
    Service { status: u16, body: String },

    /// 传输层错误
    #[error("transport error: {0}")]
    Transport(String),
}

/// 生成服务客户端 trait
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 发起一次补全请求
    async fn complete(
        &self,
        system_instruction: &str,
        user_payload: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError>;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

/// HTTP 生成服务客户端
pub struct HttpGenerationClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpGenerationClient {
    /// 由配置创建客户端，超时由底层 HTTP 客户端强制执行
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn complete(
        &self,
        system_instruction: &str,
        user_payload: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::Unconfigured);
        }

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_instruction},
                {"role": "user", "content": user_payload}
            ],
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| GenerationError::Transport("empty choices in response".to_string()))
    }
}
