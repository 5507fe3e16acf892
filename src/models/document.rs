//! 文档模型
//!
//! 知识库文档的统一表示。文档在索引构建时创建，构建后不可变，
//! 只能通过全量重建替换。

use serde::{Deserialize, Serialize};

/// 文档来源载荷
///
/// 封闭的标签变体，保留原始记录的字段，渲染时按类型匹配。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentSource {
    /// FAQ 条目
    Faq {
        /// 问题
        question: String,
        /// 答案
        answer: String,
    },
    /// 政策条目
    Policy {
        /// 标题
        title: String,
        /// 正文
        body: String,
    },
}

impl DocumentSource {
    /// 类型标识（用于文档 ID 前缀和展示）
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Faq { .. } => "faq",
            DocumentSource::Policy { .. } => "policy",
        }
    }
}

/// 知识库文档
///
/// `content` 是用于嵌入和展示的扁平文本，由来源字段带标签拼接而成。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// 文档唯一标识，格式 `<type>_<source_id>`
    pub id: String,

    /// 分类
    pub category: String,

    /// 扁平化文本内容
    pub content: String,

    /// 原始来源载荷
    pub source: DocumentSource,
}

impl Document {
    /// 由 FAQ 记录构建文档
    pub fn from_faq(source_id: &str, category: &str, question: &str, answer: &str) -> Self {
        Self {
            id: format!("faq_{}", source_id),
            category: category.to_string(),
            content: format!("Question: {}\nAnswer: {}", question, answer),
            source: DocumentSource::Faq {
                question: question.to_string(),
                answer: answer.to_string(),
            },
        }
    }

    /// 由政策记录构建文档
    pub fn from_policy(source_id: &str, category: &str, title: &str, body: &str) -> Self {
        Self {
            id: format!("policy_{}", source_id),
            category: category.to_string(),
            content: format!(
                "Title: {}\nCategory: {}\nContent: {}",
                title, category, body
            ),
            source: DocumentSource::Policy {
                title: title.to_string(),
                body: body.to_string(),
            },
        }
    }

    /// 文档类型标识
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}
