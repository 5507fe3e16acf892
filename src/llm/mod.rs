//! 生成模块
//!
//! 提示词构建与外部补全服务调用，失败时提供确定性回退答案。

pub mod client;
pub mod prompt;

pub use client::{GenerationClient, GenerationError, HttpGenerationClient};
pub use prompt::{ChatMode, build_prompt};

/// 构建提示词并发起一次补全，单次尝试、不重试
pub async fn generate(
    client: &dyn GenerationClient,
    query: &str,
    context: &str,
    history: &str,
    mode: ChatMode,
    temperature: f32,
    max_tokens: u32,
) -> Result<String, GenerationError> {
    let (system_instruction, user_payload) = build_prompt(query, context, history, mode);
    client
        .complete(&system_instruction, &user_payload, temperature, max_tokens)
        .await
}

/// 确定性回退答案
///
/// 不依赖网络，原样回显用户问题，保证终端用户总能得到答复。
pub fn fallback_text(query: &str) -> String {
    format!(
        "I apologize, but I'm having trouble processing your request right now.\n\
         \n\
         However, I can help you with:\n\
         * Account management questions\n\
         * Billing and payment inquiries\n\
         * Technical support issues\n\
         * Subscription and plan information\n\
         * Privacy and security questions\n\
         \n\
         Your question was: \"{}\".\n\
         Please try rephrasing your question or contact support.",
        query
    )
}
