//! 索引模块
//!
//! 向量索引在初始化后以读为主：并发检索共享读锁，重建在独占段内
//! 构造新状态并原子换入，检索永远不会看到半成品索引。

pub mod embedding;
pub mod snapshot;

pub use embedding::{EmbeddingModel, HashingEmbeddingModel, create_embedding_model};
pub use snapshot::IndexSnapshot;

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::Document;

/// 单次查询的检索结果，不持久化
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// 命中的文档（共享引用）
    pub document: Arc<Document>,
    /// 余弦相似度，范围 [-1, 1]
    pub score: f32,
    /// 排名，从 1 开始
    pub rank: usize,
}

/// 索引内部状态，整体换入换出
struct IndexState {
    model_name: String,
    documents: Vec<Arc<Document>>,
    vectors: Vec<Vec<f32>>,
    ready: bool,
}

impl IndexState {
    fn empty() -> Self {
        Self {
            model_name: String::new(),
            documents: Vec::new(),
            vectors: Vec::new(),
            ready: false,
        }
    }
}

/// 向量索引服务
pub struct VectorIndex {
    embedding_model: Box<dyn EmbeddingModel>,
    snapshot_path: PathBuf,
    state: RwLock<IndexState>,
}

impl VectorIndex {
    /// 创建未初始化的索引
    pub fn new(embedding_model: Box<dyn EmbeddingModel>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            embedding_model,
            snapshot_path: snapshot_path.into(),
            state: RwLock::new(IndexState::empty()),
        }
    }

    /// 初始化索引
    ///
    /// 存在模型匹配的快照时直接加载；否则对全部文档批量编码并持久化
    /// 新快照。任何不匹配（快照缺失、模型不同、文件损坏）都触发全量重建。
    pub async fn initialize(&self, documents: &[Arc<Document>]) -> Result<()> {
        let model_name = self.embedding_model.model_name();

        if let Some(snapshot) = IndexSnapshot::load(&self.snapshot_path) {
            if snapshot.is_compatible(model_name) {
                info!(
                    "Index snapshot loaded: {} vectors (model: {})",
                    snapshot.vectors.len(),
                    model_name
                );
                let mut state = self.state.write().await;
                *state = IndexState {
                    model_name: snapshot.model_name,
                    documents: snapshot.documents.into_iter().map(Arc::new).collect(),
                    vectors: snapshot.vectors,
                    ready: true,
                };
                return Ok(());
            }
            info!(
                "Index snapshot is stale (saved with model {}, configured {}), rebuilding",
                snapshot.model_name, model_name
            );
        }

        self.rebuild(documents).await
    }

    /// 全量重建索引并持久化快照
    ///
    /// 编码在锁外进行，新状态整体换入，重建期间在途检索继续读取旧状态。
    pub async fn rebuild(&self, documents: &[Arc<Document>]) -> Result<()> {
        let model_name = self.embedding_model.model_name().to_string();

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedding_model.encode_batch(&texts).await?
        };

        let snapshot = IndexSnapshot {
            model_name: model_name.clone(),
            documents: documents.iter().map(|d| (**d).clone()).collect(),
            vectors: vectors.clone(),
        };
        snapshot.save(&self.snapshot_path)?;

        let new_state = IndexState {
            model_name,
            documents: documents.to_vec(),
            vectors,
            ready: true,
        };

        let mut state = self.state.write().await;
        *state = new_state;
        info!("Index rebuilt: {} vectors", state.vectors.len());

        Ok(())
    }

    /// Top-k 余弦相似度检索
    ///
    /// 结果按分数严格降序，同分按原始文档顺序；k 超过语料规模时返回
    /// 全部结果；索引为空时返回空序列而不是错误。
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        let query_vector = self.embedding_model.encode(query).await?;

        let state = self.state.read().await;
        if state.vectors.is_empty() {
            debug!("Search on empty index, returning no context");
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| (i, Self::cosine_similarity(&query_vector, vector)))
            .collect();

        // 分数降序，同分保持原始文档顺序
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(rank, (i, score))| RetrievalResult {
                document: state.documents[i].clone(),
                score,
                rank: rank + 1,
            })
            .collect())
    }

    /// 索引是否已初始化
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.ready
    }

    /// 已索引的文档数量
    pub async fn len(&self) -> usize {
        self.state.read().await.vectors.len()
    }

    /// 当前索引使用的模型标识
    pub async fn model_name(&self) -> String {
        self.state.read().await.model_name.clone()
    }

    /// 将检索结果格式化为提示词上下文块
    pub fn format_context(results: &[RetrievalResult]) -> String {
        if results.is_empty() {
            return "No relevant information found.".to_string();
        }

        let mut lines = vec!["Relevant Information:".to_string()];
        for result in results {
            let doc = &result.document;
            lines.push(String::new());
            lines.push(format!(
                "[Source {}] (Relevance: {:.2}%)",
                result.rank,
                result.score * 100.0
            ));
            lines.push(format!("Type: {}", doc.kind().to_uppercase()));
            lines.push(format!("Category: {}", doc.category));
            lines.push(format!("Content: {}", doc.content));
            lines.push("-".repeat(80));
        }
        lines.join("\n")
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}
