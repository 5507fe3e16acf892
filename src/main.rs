use broca::api::{self, app_state::AppState};
use broca::config::ConfigLoader;
use broca::index::{VectorIndex, create_embedding_model};
use broca::knowledge::KnowledgeStore;
use broca::llm::HttpGenerationClient;
use broca::memory::ConversationMemory;
use broca::observability::AppMetrics;
use broca::services::create_chat_service;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("Starting Broca...");
    info!("Configuration loaded successfully");

    // Knowledge base load is fatal: the service never reports ready without it
    let mut knowledge = KnowledgeStore::new(config.knowledge.data_dir.clone());
    knowledge.load()?;
    let knowledge = Arc::new(knowledge);
    info!(
        "Knowledge store loaded: {} documents",
        knowledge.documents().len()
    );

    let embedding_model = create_embedding_model(&config.embedding)?;
    info!(
        "Embedding model initialized: {} (backend: {})",
        embedding_model.model_name(),
        config.embedding.backend
    );

    let index = Arc::new(VectorIndex::new(
        embedding_model,
        config.index.snapshot_path.clone(),
    ));
    index.initialize(knowledge.documents()).await?;
    info!("Vector index ready: {} vectors", index.len().await);

    let memory = Arc::new(ConversationMemory::new(config.memory.max_messages));
    info!("Conversation memory initialized");

    if config.llm.api_key.is_empty() {
        warn!("LLM API key not configured; chat responses will use the fallback text");
    }
    let generation = Arc::new(HttpGenerationClient::new(&config.llm)?);
    info!("Generation client initialized: {}", config.llm.model);

    let metrics = Arc::new(AppMetrics::default());

    let chat_service = create_chat_service(
        index.clone(),
        memory.clone(),
        generation,
        metrics.clone(),
        config.memory.prompt_window,
        config.llm.max_tokens,
        config.llm.temperature,
    );
    info!("Chat service initialized");

    let app_state = AppState::new(knowledge, index, memory, chat_service, metrics);
    let router = api::create_router(app_state);
    info!("API router created");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
