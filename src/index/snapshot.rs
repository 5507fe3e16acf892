//! 索引快照持久化
//!
//! 快照是单一制品：模型标识 + 有序向量 + 有序文档，整体读写。
//! 模型标识不匹配或文件损坏时快照作废，只能全量重建，不做增量修补。

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::models::Document;

/// 索引快照
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexSnapshot {
    /// 生成向量时使用的模型标识
    pub model_name: String,
    /// 有序文档序列
    pub documents: Vec<Document>,
    /// 与文档按位置一一对应的向量序列
    pub vectors: Vec<Vec<f32>>,
}

impl IndexSnapshot {
    /// 从文件加载快照
    ///
    /// 文件缺失或损坏返回 `None`，由调用方触发重建。损坏只记录日志，
    /// 不会向上传播。
    pub fn load(path: &Path) -> Option<IndexSnapshot> {
        if !path.exists() {
            return None;
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read index snapshot {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<IndexSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    "Corrupt index snapshot {}: {} (will rebuild)",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// 保存快照到文件，必要时创建父目录
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// 快照是否可用于给定模型
    pub fn is_compatible(&self, model_name: &str) -> bool {
        self.model_name == model_name && self.documents.len() == self.vectors.len()
    }
}
