//! 提示词构建
//!
//! 按模式选取系统指令，将会话转录、检索上下文与原始问题按固定顺序
//! 拼接为用户载荷；空的部分整体省略，不输出空标签块。

/// 对话模式
///
/// 未知的模式字符串一律回退到通用助手，不报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// 通用助手
    #[default]
    Default,
    /// 商务助手
    Business,
    /// 教育辅导
    Education,
}

impl ChatMode {
    /// 解析模式字符串，未知值回退为 `Default`
    pub fn parse(mode: &str) -> Self {
        match mode {
            "business" => ChatMode::Business,
            "education" => ChatMode::Education,
            _ => ChatMode::Default,
        }
    }

    /// 模式对应的系统指令
    pub fn system_instruction(&self) -> &'static str {
        match self {
            ChatMode::Business => {
                "You are a business professional assistant. Provide detailed, structured, \
                 precise answers for business-related queries. Be professional, concise, \
                 and actionable."
            }
            ChatMode::Education => {
                "You are an educational tutor assistant. Explain concepts clearly, give \
                 examples, and help the user understand step by step."
            }
            ChatMode::Default => {
                "You are an intelligent, professional assistant with deep knowledge in \
                 AI, education, coding, reasoning, technology, and research. Always give \
                 detailed, structured, clear answers grounded in the provided context."
            }
        }
    }
}

/// 构建（系统指令, 用户载荷）
///
/// 载荷的固定顺序：会话转录、检索上下文、原始问题。
pub fn build_prompt(
    query: &str,
    context: &str,
    history: &str,
    mode: ChatMode,
) -> (String, String) {
    let system_instruction = mode.system_instruction().to_string();

    let mut user_payload = String::new();
    if !history.is_empty() {
        user_payload.push_str(&format!("Conversation History:\n{}\n", history));
    }
    if !context.is_empty() {
        user_payload.push_str(&format!("Context:\n{}\n", context));
    }
    user_payload.push_str(&format!("User Question:\n{}\n", query));

    (system_instruction, user_payload)
}
