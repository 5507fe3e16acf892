//! 数据模型模块

pub mod document;
pub mod message;

pub use document::{Document, DocumentSource};
pub use message::{AnalyticsRecord, Role, SessionMessage};
