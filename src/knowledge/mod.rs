//! 知识库模块
//!
//! 从 JSON 数据文件加载 FAQ 与政策条目，归一化为统一的文档表示。
//! 加载是全或无的：任一数据文件缺失则整体失败，已加载的状态保持不变。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Document, DocumentSource};

/// FAQ 原始记录
#[derive(Debug, Deserialize)]
struct RawFaq {
    id: Option<Value>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    category: Option<String>,
}

/// 政策原始记录
#[derive(Debug, Deserialize)]
struct RawPolicy {
    id: Option<Value>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: Option<String>,
}

/// 原始 ID 可能是数字或字符串，缺失时记为 "NA"
fn source_id(id: &Option<Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "NA".to_string(),
    }
}

/// 知识库统计信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStatistics {
    /// 文档总数
    pub total_documents: usize,
    /// FAQ 数量
    pub total_faqs: usize,
    /// 政策数量
    pub total_policies: usize,
    /// 去重后的分类集合
    pub categories: Vec<String>,
}

/// 知识库
///
/// 加载完成后只读，作为向量索引的文档来源。
pub struct KnowledgeStore {
    data_dir: PathBuf,
    documents: Vec<Arc<Document>>,
}

impl KnowledgeStore {
    /// 创建空知识库
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            documents: Vec::new(),
        }
    }

    /// 加载 faqs.json 和 policies.json
    ///
    /// 两个文件都解析成功后才替换内部状态。
    pub fn load(&mut self) -> Result<()> {
        let faqs: Vec<RawFaq> = Self::read_collection(&self.data_dir.join("faqs.json"))?;
        let policies: Vec<RawPolicy> =
            Self::read_collection(&self.data_dir.join("policies.json"))?;

        let mut documents = Vec::with_capacity(faqs.len() + policies.len());

        for faq in &faqs {
            documents.push(Arc::new(Document::from_faq(
                &source_id(&faq.id),
                faq.category.as_deref().unwrap_or("General"),
                &faq.question,
                &faq.answer,
            )));
        }

        for policy in &policies {
            documents.push(Arc::new(Document::from_policy(
                &source_id(&policy.id),
                policy.category.as_deref().unwrap_or("General"),
                &policy.title,
                &policy.content,
            )));
        }

        info!(
            "Loaded {} FAQs and {} policies from {}",
            faqs.len(),
            policies.len(),
            self.data_dir.display()
        );

        self.documents = documents;
        Ok(())
    }

    fn read_collection<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Err(AppError::DataLoad(format!("{} not found", path.display())));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::DataLoad(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::DataLoad(format!("{}: {}", path.display(), e)))
    }

    /// 全量文档序列
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// 按 ID 查找文档
    pub fn get_by_id(&self, id: &str) -> Option<Arc<Document>> {
        self.documents.iter().find(|d| d.id == id).cloned()
    }

    /// 按分类查找文档（大小写不敏感）
    pub fn search_by_category(&self, category: &str) -> Vec<Arc<Document>> {
        self.documents
            .iter()
            .filter(|d| d.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    /// 统计信息
    pub fn statistics(&self) -> KnowledgeStatistics {
        let total_faqs = self.documents.iter().filter(|d| d.kind() == "faq").count();
        let total_policies = self
            .documents
            .iter()
            .filter(|d| d.kind() == "policy")
            .count();
        let categories: BTreeSet<String> = self
            .documents
            .iter()
            .map(|d| d.category.clone())
            .collect();

        KnowledgeStatistics {
            total_documents: self.documents.len(),
            total_faqs,
            total_policies,
            categories: categories.into_iter().collect(),
        }
    }
}
