//! 对话编排服务
//!
//! 每次请求按固定顺序推进：取历史 → 检索上下文 → 生成 → 失败则回退
//! → 更新记忆与分析 → 构造响应。检索失败降级为空上下文继续；生成失败
//! 以回退文本作答且对调用方仍为成功；只有编排自身的意外故障才以
//! `success=false` 返回，且依旧落在正常的响应信封内。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::index::VectorIndex;
use crate::llm::{self, ChatMode, GenerationClient};
use crate::memory::ConversationMemory;
use crate::models::Role;
use crate::observability::AppMetrics;

/// 对话请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// 用户问题，非空
    pub query: String,
    /// 会话 ID，缺省时由编排器生成
    pub session_id: Option<String>,
    /// 是否检索知识库上下文
    pub include_context: bool,
    /// 检索的文档数量
    pub top_k: usize,
    /// 对话模式
    pub mode: ChatMode,
    /// 采样温度，缺省用配置默认值
    pub temperature: Option<f32>,
}

/// 对话结果信封
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// 请求是否被处理
    pub success: bool,
    /// 答复文本（生成结果或回退文本）
    pub response: String,
    /// 会话 ID（请求未携带时为新生成的）
    pub session_id: String,
    /// 从请求进入到响应构造的耗时（秒）
    pub processing_time: f64,
    /// 本次使用的上下文文档数量
    pub context_used: usize,
    /// 编排故障时的错误消息
    pub error: Option<String>,
}

/// 对话编排服务
pub struct ChatService {
    index: Arc<VectorIndex>,
    memory: Arc<ConversationMemory>,
    generation: Arc<dyn GenerationClient>,
    metrics: Arc<AppMetrics>,
    prompt_window: usize,
    max_tokens: u32,
    default_temperature: f32,
}

impl ChatService {
    pub fn new(
        index: Arc<VectorIndex>,
        memory: Arc<ConversationMemory>,
        generation: Arc<dyn GenerationClient>,
        metrics: Arc<AppMetrics>,
        prompt_window: usize,
        max_tokens: u32,
        default_temperature: f32,
    ) -> Self {
        Self {
            index,
            memory,
            generation,
            metrics,
            prompt_window,
            max_tokens,
            default_temperature,
        }
    }

    /// 处理一次对话请求
    ///
    /// 总是返回响应信封；内部故障映射为 `success=false`，不向上抛出。
    pub async fn chat(&self, request: ChatRequest) -> ChatOutcome {
        let started = Instant::now();
        self.metrics.record_chat_request();

        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match self.process(&request, &session_id, started).await {
            Ok((response, context_used)) => ChatOutcome {
                success: true,
                response,
                session_id,
                processing_time: started.elapsed().as_secs_f64(),
                context_used,
                error: None,
            },
            Err(e) => {
                warn!("Chat request failed: {}", e);
                self.metrics.record_error();
                ChatOutcome {
                    success: false,
                    response: "Internal error.".to_string(),
                    session_id,
                    processing_time: started.elapsed().as_secs_f64(),
                    context_used: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn process(
        &self,
        request: &ChatRequest,
        session_id: &str,
        started: Instant,
    ) -> Result<(String, usize)> {
        // 1. 会话转录
        let history = self.memory.format_for_prompt(session_id, self.prompt_window);

        // 2. 上下文检索，失败降级为空上下文
        let (context, context_used) = if request.include_context {
            self.metrics.record_search();
            match self.index.search(&request.query, request.top_k).await {
                Ok(results) if results.is_empty() => (String::new(), 0),
                Ok(results) => (VectorIndex::format_context(&results), results.len()),
                Err(e) => {
                    warn!("Context retrieval failed, proceeding without context: {}", e);
                    (String::new(), 0)
                }
            }
        } else {
            (String::new(), 0)
        };

        // 3. 生成，失败以确定性回退文本作答
        let temperature = request.temperature.unwrap_or(self.default_temperature);
        let response = match llm::generate(
            self.generation.as_ref(),
            &request.query,
            &context,
            &history,
            request.mode,
            temperature,
            self.max_tokens,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation failed ({}), serving fallback response", e);
                self.metrics.record_fallback();
                llm::fallback_text(&request.query)
            }
        };

        // 4. 更新记忆与分析
        let elapsed = started.elapsed().as_secs_f64();
        self.memory.add_message(
            session_id,
            Role::User,
            &request.query,
            HashMap::new(),
            context_used,
            None,
        );
        self.memory.add_message(
            session_id,
            Role::Assistant,
            &response,
            HashMap::new(),
            context_used,
            Some(elapsed),
        );

        debug!(
            session_id,
            context_used,
            elapsed,
            "Chat request completed"
        );

        Ok((response, context_used))
    }
}

/// 创建对话编排服务
pub fn create_chat_service(
    index: Arc<VectorIndex>,
    memory: Arc<ConversationMemory>,
    generation: Arc<dyn GenerationClient>,
    metrics: Arc<AppMetrics>,
    prompt_window: usize,
    max_tokens: u32,
    default_temperature: f32,
) -> Arc<ChatService> {
    Arc::new(ChatService::new(
        index,
        memory,
        generation,
        metrics,
        prompt_window,
        max_tokens,
        default_temperature,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::HashingEmbeddingModel;
    use crate::llm::GenerationError;
    use async_trait::async_trait;

    struct FixedClient {
        reply: std::result::Result<String, fn() -> GenerationError>,
    }

    #[async_trait]
    impl GenerationClient for FixedClient {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> std::result::Result<String, GenerationError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn service_with(
        dir: &tempfile::TempDir,
        reply: std::result::Result<String, fn() -> GenerationError>,
    ) -> Arc<ChatService> {
        let index = Arc::new(VectorIndex::new(
            Box::new(HashingEmbeddingModel::new(64)),
            dir.path().join("snapshot.json"),
        ));
        create_chat_service(
            index,
            Arc::new(ConversationMemory::new(10)),
            Arc::new(FixedClient { reply }),
            Arc::new(AppMetrics::default()),
            5,
            100,
            0.4,
        )
    }

    fn request(query: &str, session_id: Option<String>) -> ChatRequest {
        ChatRequest {
            query: query.to_string(),
            session_id,
            include_context: true,
            top_k: 3,
            mode: ChatMode::Default,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_session_id_generated_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Ok("hello".to_string()));
        service.index.initialize(&[]).await.unwrap();

        let outcome = service.chat(request("hi", None)).await;
        assert!(outcome.success);
        assert!(!outcome.session_id.is_empty());
        assert!(outcome.processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_generation_failure_serves_fallback_as_success() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Err(|| GenerationError::Timeout));
        service.index.initialize(&[]).await.unwrap();

        let outcome = service.chat(request("where is my invoice?", None)).await;
        assert!(outcome.success);
        assert!(outcome.response.contains("where is my invoice?"));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_memory_updated_with_both_messages() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Ok("the answer".to_string()));
        service.index.initialize(&[]).await.unwrap();

        let outcome = service
            .chat(request("first question", Some("s1".to_string())))
            .await;
        assert_eq!(outcome.session_id, "s1");

        let history = service.memory.get_history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "first question");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "the answer");
    }

    #[tokio::test]
    async fn test_context_disabled_skips_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Ok("ok".to_string()));
        service
            .index
            .initialize(&[Arc::new(crate::models::Document::from_faq(
                "1", "General", "Q", "A",
            ))])
            .await
            .unwrap();

        let mut req = request("Q", None);
        req.include_context = false;
        let outcome = service.chat(req).await;

        assert!(outcome.success);
        assert_eq!(outcome.context_used, 0);
    }
}
