// End-to-end tests for the chat pipeline
//
// Covers the full request cycle: history fetch, context retrieval,
// generation, fallback substitution, and memory updates.

use std::sync::Arc;

use async_trait::async_trait;
use broca::config::LlmConfig;
use broca::index::{HashingEmbeddingModel, VectorIndex};
use broca::llm::{ChatMode, GenerationClient, GenerationError, HttpGenerationClient};
use broca::memory::ConversationMemory;
use broca::models::Document;
use broca::observability::AppMetrics;
use broca::services::{ChatRequest, ChatService, create_chat_service};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct ScriptedClient {
    reply: Result<String, GenerationError>,
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, GenerationError> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(GenerationError::Timeout) => Err(GenerationError::Timeout),
            Err(GenerationError::Unconfigured) => Err(GenerationError::Unconfigured),
            Err(GenerationError::Service { status, body }) => Err(GenerationError::Service {
                status: *status,
                body: body.clone(),
            }),
            Err(GenerationError::Transport(detail)) => {
                Err(GenerationError::Transport(detail.clone()))
            }
        }
    }
}

fn password_corpus() -> Vec<Arc<Document>> {
    vec![
        Arc::new(Document::from_faq(
            "1",
            "Account",
            "How do I reset my password?",
            "Go to the login page, click Forgot Password, and follow the instructions.",
        )),
        Arc::new(Document::from_faq(
            "2",
            "Billing",
            "How do I download an invoice?",
            "Open billing history and choose the invoice.",
        )),
        Arc::new(Document::from_policy(
            "1",
            "Privacy",
            "Data Retention",
            "Personal data is kept for twelve months.",
        )),
    ]
}

async fn build_service(
    dir: &tempfile::TempDir,
    corpus: &[Arc<Document>],
    client: Arc<dyn GenerationClient>,
) -> (Arc<ChatService>, Arc<VectorIndex>, Arc<ConversationMemory>) {
    let index = Arc::new(VectorIndex::new(
        Box::new(HashingEmbeddingModel::new(128)),
        dir.path().join("snapshot.json"),
    ));
    index.initialize(corpus).await.unwrap();

    let memory = Arc::new(ConversationMemory::new(10));
    let service = create_chat_service(
        index.clone(),
        memory.clone(),
        client,
        Arc::new(AppMetrics::default()),
        5,
        200,
        0.4,
    );
    (service, index, memory)
}

fn chat_request(query: &str, session_id: Option<&str>) -> ChatRequest {
    ChatRequest {
        query: query.to_string(),
        session_id: session_id.map(str::to_string),
        include_context: true,
        top_k: 3,
        mode: ChatMode::Default,
        temperature: None,
    }
}

// Scenario A: empty corpus with context requested still succeeds
#[tokio::test]
async fn test_empty_corpus_chat_succeeds_without_context() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient {
        reply: Ok("generated without context".to_string()),
    });
    let (service, _, _) = build_service(&dir, &[], client).await;

    let outcome = service.chat(chat_request("anything at all?", None)).await;

    assert!(outcome.success);
    assert_eq!(outcome.context_used, 0);
    assert_eq!(outcome.response, "generated without context");
}

// Scenario B: the password-reset FAQ wins the retrieval for a password query
#[tokio::test]
async fn test_password_query_retrieves_password_faq() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient {
        reply: Ok("ok".to_string()),
    });
    let (_, index, _) = build_service(&dir, &password_corpus(), client).await;

    let results = index
        .search("How do I reset my password?", 1)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "faq_1");
    assert_eq!(results[0].rank, 1);
}

// Scenario C: the second call in a session sees the first exchange verbatim
#[tokio::test]
async fn test_history_carries_across_calls_in_same_session() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient {
        reply: Ok("first answer".to_string()),
    });
    let (service, _, memory) = build_service(&dir, &password_corpus(), client).await;

    let first = service
        .chat(chat_request("How do I reset my password?", Some("s-42")))
        .await;
    assert!(first.success);

    let transcript = memory.format_for_prompt("s-42", 5);
    assert!(transcript.contains("User: How do I reset my password?"));
    assert!(transcript.contains("Assistant: first answer"));

    let second = service
        .chat(chat_request("And how do I change my email?", Some("s-42")))
        .await;
    assert!(second.success);
    assert_eq!(second.session_id, "s-42");
    assert_eq!(memory.get_history("s-42").len(), 4);
}

// Scenario D: an unreachable generation service yields the deterministic
// fallback while the request still reports success
#[tokio::test]
async fn test_generation_timeout_falls_back_but_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(5))
                .set_body_json(serde_json::json!({"choices": []})),
        )
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_url: format!("{}/v1/chat/completions", server.uri()),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        timeout: 1,
        max_tokens: 200,
        temperature: 0.4,
    };
    let client = Arc::new(HttpGenerationClient::new(&config).unwrap());

    let dir = tempfile::tempdir().unwrap();
    let (service, _, memory) = build_service(&dir, &password_corpus(), client).await;

    let outcome = service
        .chat(chat_request("How do I reset my password?", Some("s-timeout")))
        .await;

    assert!(outcome.success);
    assert!(outcome.error.is_none());
    assert!(outcome.response.contains("How do I reset my password?"));
    assert!(outcome.context_used >= 1);

    // the fallback exchange still lands in memory and analytics
    assert_eq!(memory.get_history("s-timeout").len(), 2);
    assert_eq!(memory.analytics_summary().total_messages, 2);
}

// Clearing a session mid-conversation keeps analytics intact
#[tokio::test]
async fn test_clear_session_preserves_analytics() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient {
        reply: Ok("answer".to_string()),
    });
    let (service, _, memory) = build_service(&dir, &password_corpus(), client).await;

    service
        .chat(chat_request("hello there", Some("s-clear")))
        .await;
    assert_eq!(memory.analytics_summary().total_messages, 2);

    memory.clear_session("s-clear");
    assert!(memory.get_history("s-clear").is_empty());
    assert_eq!(memory.analytics_summary().total_messages, 2);

    // the next chat in the same session starts from a fresh transcript
    let outcome = service
        .chat(chat_request("are you still there?", Some("s-clear")))
        .await;
    assert!(outcome.success);
    assert_eq!(memory.get_history("s-clear").len(), 2);
}

// Analytics records carry the retrieval count and processing time
#[tokio::test]
async fn test_analytics_tagged_with_context_and_timing() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(ScriptedClient {
        reply: Ok("answer".to_string()),
    });
    let (service, _, memory) = build_service(&dir, &password_corpus(), client).await;

    let outcome = service
        .chat(chat_request("How do I reset my password?", Some("s-tags")))
        .await;
    assert!(outcome.success);

    let records = memory.analytics_for_session("s-tags");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].context_used, outcome.context_used);
    assert!(records[1].processing_time.is_some());
}
