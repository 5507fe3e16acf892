//! 会话记忆模块
//!
//! 每个会话维护一个有界的滑动窗口历史（FIFO 淘汰），同时向无界的
//! 分析日志追加记录。历史可被清除，分析日志跨会话清除保留。
//! 同一会话的变更按分片锁串行，不同会话并行。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::models::{AnalyticsRecord, Role, SessionMessage};

/// 会话开始前的占位转录
pub const START_OF_CONVERSATION: &str = "This is the start of the conversation.";

/// 会话统计信息
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    /// 消息总数
    pub total_messages: usize,
    /// 用户消息数
    pub user_messages: usize,
    /// 助手消息数
    pub assistant_messages: usize,
    /// 首条消息时间
    pub session_start: Option<DateTime<Utc>>,
    /// 末条消息时间
    pub session_end: Option<DateTime<Utc>>,
    /// 会话时长（秒），不足两条消息时为 0
    pub duration_seconds: f64,
}

/// 全局分析汇总
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsSummary {
    /// 日志消息总数
    pub total_messages: usize,
    /// 用户消息数
    pub user_messages: usize,
    /// 助手消息数
    pub assistant_messages: usize,
}

/// 会话导出
#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    /// 会话 ID
    pub session_id: String,
    /// 全量历史
    pub messages: Vec<SessionMessage>,
    /// 统计信息
    pub stats: SessionStats,
}

/// 会话记忆
pub struct ConversationMemory {
    max_messages: usize,
    sessions: DashMap<String, VecDeque<SessionMessage>>,
    analytics: Mutex<Vec<AnalyticsRecord>>,
}

impl ConversationMemory {
    /// 创建会话记忆，`max_messages` 为单会话窗口容量
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            sessions: DashMap::new(),
            analytics: Mutex::new(Vec::new()),
        }
    }

    /// 追加消息到会话历史，并无条件追加一条分析记录
    ///
    /// 会话不存在时惰性创建；超出容量时淘汰最旧的消息。
    pub fn add_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: HashMap<String, String>,
        context_used: usize,
        processing_time: Option<f64>,
    ) {
        let message = SessionMessage::new(role, content, metadata.clone());

        {
            let mut history = self.sessions.entry(session_id.to_string()).or_default();
            history.push_back(message.clone());
            while history.len() > self.max_messages {
                history.pop_front();
            }
        }

        self.analytics.lock().push(AnalyticsRecord {
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            timestamp: message.timestamp,
            context_used,
            processing_time,
            metadata,
        });
    }

    /// 会话全量历史，未知会话返回空序列
    pub fn get_history(&self, session_id: &str) -> Vec<SessionMessage> {
        self.sessions
            .get(session_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 最近 n 条消息
    pub fn last_n(&self, session_id: &str, n: usize) -> Vec<SessionMessage> {
        let history = self.get_history(session_id);
        let skip = history.len().saturating_sub(n);
        history.into_iter().skip(skip).collect()
    }

    /// 会话是否存在
    pub fn contains_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// 将最近 n 条消息格式化为提示词转录
    ///
    /// 无历史时返回规范的会话开始占位串。
    pub fn format_for_prompt(&self, session_id: &str, last_n: usize) -> String {
        let messages = self.last_n(session_id, last_n);

        if messages.is_empty() {
            return START_OF_CONVERSATION.to_string();
        }

        let mut lines = vec!["Previous conversation:".to_string()];
        for message in &messages {
            lines.push(format!("{}: {}", message.role.label(), message.content));
        }
        lines.join("\n")
    }

    /// 清除会话历史，幂等；分析记录不受影响
    pub fn clear_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// 会话统计，未知会话返回零值
    pub fn session_stats(&self, session_id: &str) -> SessionStats {
        let history = self.get_history(session_id);

        if history.is_empty() {
            return SessionStats::default();
        }

        let user_messages = history.iter().filter(|m| m.role == Role::User).count();
        let assistant_messages = history
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count();

        let first = history.first().map(|m| m.timestamp);
        let last = history.last().map(|m| m.timestamp);
        let duration_seconds = if history.len() < 2 {
            0.0
        } else {
            match (first, last) {
                (Some(first), Some(last)) => {
                    (last - first).num_milliseconds() as f64 / 1000.0
                }
                _ => 0.0,
            }
        };

        SessionStats {
            total_messages: history.len(),
            user_messages,
            assistant_messages,
            session_start: first,
            session_end: last,
            duration_seconds,
        }
    }

    /// 全局分析汇总，独立于任何会话边界
    pub fn analytics_summary(&self) -> AnalyticsSummary {
        let log = self.analytics.lock();
        let user_messages = log.iter().filter(|r| r.role == Role::User).count();
        let assistant_messages = log.iter().filter(|r| r.role == Role::Assistant).count();

        AnalyticsSummary {
            total_messages: log.len(),
            user_messages,
            assistant_messages,
        }
    }

    /// 某会话的分析记录（按追加顺序）
    pub fn analytics_for_session(&self, session_id: &str) -> Vec<AnalyticsRecord> {
        self.analytics
            .lock()
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }

    /// 活跃会话数量
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// 导出会话历史与统计
    pub fn export_session(&self, session_id: &str) -> SessionExport {
        SessionExport {
            session_id: session_id.to_string(),
            messages: self.get_history(session_id),
            stats: self.session_stats(session_id),
        }
    }
}

/// 创建会话记忆
pub fn create_conversation_memory(max_messages: usize) -> ConversationMemory {
    ConversationMemory::new(max_messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(memory: &ConversationMemory, session: &str, role: Role, content: &str) {
        memory.add_message(session, role, content, HashMap::new(), 0, None);
    }

    #[test]
    fn test_history_created_lazily() {
        let memory = ConversationMemory::new(10);
        assert!(memory.get_history("missing").is_empty());
        assert_eq!(memory.active_sessions(), 0);

        add(&memory, "s1", Role::User, "hello");
        assert_eq!(memory.active_sessions(), 1);
        assert_eq!(memory.get_history("s1").len(), 1);
    }

    #[test]
    fn test_sliding_window_evicts_oldest_first() {
        let memory = ConversationMemory::new(3);
        for i in 0..5 {
            add(&memory, "s1", Role::User, &format!("msg-{}", i));
        }

        let history = memory.get_history("s1");
        assert_eq!(history.len(), 3);
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg-2", "msg-3", "msg-4"]);
    }

    #[test]
    fn test_format_for_prompt_sentinel_and_order() {
        let memory = ConversationMemory::new(10);
        assert_eq!(memory.format_for_prompt("s1", 5), START_OF_CONVERSATION);

        add(&memory, "s1", Role::User, "Hello!");
        add(&memory, "s1", Role::Assistant, "Hi! How can I help you?");

        let transcript = memory.format_for_prompt("s1", 5);
        assert_eq!(
            transcript,
            "Previous conversation:\nUser: Hello!\nAssistant: Hi! How can I help you?"
        );
    }

    #[test]
    fn test_format_for_prompt_respects_window() {
        let memory = ConversationMemory::new(10);
        for i in 0..6 {
            add(&memory, "s1", Role::User, &format!("msg-{}", i));
        }

        let transcript = memory.format_for_prompt("s1", 2);
        assert!(!transcript.contains("msg-3"));
        assert!(transcript.contains("msg-4"));
        assert!(transcript.contains("msg-5"));
    }

    #[test]
    fn test_clear_session_is_idempotent_and_keeps_analytics() {
        let memory = ConversationMemory::new(10);
        add(&memory, "s1", Role::User, "hello");
        add(&memory, "s1", Role::Assistant, "hi");

        memory.clear_session("s1");
        assert!(memory.get_history("s1").is_empty());
        assert!(!memory.contains_session("s1"));

        // clearing an unknown session is a no-op, not an error
        memory.clear_session("s1");
        memory.clear_session("never-existed");

        let summary = memory.analytics_summary();
        assert_eq!(summary.total_messages, 2);
        assert_eq!(memory.analytics_for_session("s1").len(), 2);
    }

    #[test]
    fn test_session_stats() {
        let memory = ConversationMemory::new(10);
        assert_eq!(memory.session_stats("s1").total_messages, 0);
        assert_eq!(memory.session_stats("s1").duration_seconds, 0.0);

        add(&memory, "s1", Role::User, "one");
        let single = memory.session_stats("s1");
        assert_eq!(single.total_messages, 1);
        assert_eq!(single.duration_seconds, 0.0);

        add(&memory, "s1", Role::Assistant, "two");
        let stats = memory.session_stats("s1");
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.user_messages, 1);
        assert_eq!(stats.assistant_messages, 1);
        assert!(stats.session_start <= stats.session_end);
        assert!(stats.duration_seconds >= 0.0);
    }

    #[test]
    fn test_analytics_tagging() {
        let memory = ConversationMemory::new(10);
        memory.add_message("s1", Role::Assistant, "answer", HashMap::new(), 3, Some(0.42));

        let records = memory.analytics_for_session("s1");
        assert_eq!(records[0].context_used, 3);
        assert_eq!(records[0].processing_time, Some(0.42));
    }

    #[test]
    fn test_sessions_are_independent() {
        let memory = ConversationMemory::new(10);
        add(&memory, "a", Role::User, "from a");
        add(&memory, "b", Role::User, "from b");

        memory.clear_session("a");
        assert!(memory.get_history("a").is_empty());
        assert_eq!(memory.get_history("b").len(), 1);
    }

    #[test]
    fn test_concurrent_appends_lose_no_records() {
        use std::sync::Arc;

        let memory = Arc::new(ConversationMemory::new(100));
        let mut handles = Vec::new();

        for t in 0..4 {
            let memory = memory.clone();
            handles.push(std::thread::spawn(move || {
                let session = format!("s{}", t);
                for i in 0..50 {
                    memory.add_message(
                        &session,
                        Role::User,
                        &format!("msg-{}", i),
                        HashMap::new(),
                        0,
                        None,
                    );
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(memory.analytics_summary().total_messages, 200);
        // per-session append order preserved
        let records = memory.analytics_for_session("s0");
        let ordered: Vec<_> = (0..50).map(|i| format!("msg-{}", i)).collect();
        let actual: Vec<_> = records.iter().map(|r| r.content.clone()).collect();
        assert_eq!(actual, ordered);
    }
}
