use crate::index::VectorIndex;
use crate::knowledge::KnowledgeStore;
use crate::memory::ConversationMemory;
use crate::observability::AppMetrics;
use crate::services::ChatService;
use std::sync::Arc;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Knowledge store, read-only after startup load
    pub knowledge: Arc<KnowledgeStore>,
    /// Vector index for context retrieval
    pub index: Arc<VectorIndex>,
    /// Conversation memory and analytics log
    pub memory: Arc<ConversationMemory>,
    /// Chat orchestration service
    pub chat_service: Arc<ChatService>,
    /// Application metrics
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("knowledge", &"Arc<KnowledgeStore>")
            .field("index", &"Arc<VectorIndex>")
            .field("memory", &"Arc<ConversationMemory>")
            .field("chat_service", &"Arc<ChatService>")
            .field("metrics", &"Arc<AppMetrics>")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        knowledge: Arc<KnowledgeStore>,
        index: Arc<VectorIndex>,
        memory: Arc<ConversationMemory>,
        chat_service: Arc<ChatService>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            knowledge,
            index,
            memory,
            chat_service,
            metrics,
        }
    }
}
