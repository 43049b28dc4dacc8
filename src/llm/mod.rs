//! LLM访问层：流水线只依赖 [`CompletionBackend`]，具体的模型服务由 [`client::LLMClient`] 提供

use anyhow::Result;
use async_trait::async_trait;

pub mod client;
pub mod json;

pub use client::LLMClient;

/// 文本补全后端
///
/// 每个阶段的Agent都通过它发送一组（系统提示词，用户提示词），并拿回模型的原始文本输出。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
