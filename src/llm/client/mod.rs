//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::LLMConfig;
use crate::llm::CompletionBackend;
use crate::llm::client::utils::evaluate_befitting_model;

mod providers;
pub mod utils;

use providers::ProviderClient;

/// LLM客户端 - 基于rig的多Provider实现
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        info!("🔄 正在检查模型连接 ({})...", self.config.provider);
        match self
            .prompt_once(
                &self.config.model_efficient,
                "You are a helpful assistant.",
                "Hello",
            )
            .await
        {
            Ok(_) => {
                info!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                error!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }

    /// 单次模型调用，受 timeout_seconds 约束
    async fn prompt_once(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let agent = self.client.create_agent(model, system_prompt, &self.config)?;
        let timeout = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(timeout, agent.prompt(user_prompt)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "模型 {} 在 {} 秒内未返回结果",
                model,
                self.config.timeout_seconds
            )),
        }
    }

    async fn complete_inner(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        befitting_model: String,
        fallover_model: Option<String>,
    ) -> Result<String> {
        debug!("调用模型 {}", befitting_model);
        let result = retry_with_backoff(
            self.config.retry_attempts,
            self.config.retry_delay_ms,
            || self.prompt_once(&befitting_model, system_prompt, user_prompt),
        )
        .await;

        match (result, fallover_model) {
            (Ok(text), _) => Ok(text),
            (Err(e), Some(model)) => {
                warn!(
                    "❌ 调用模型服务出错，尝试 {} 次均失败，尝试使用备选模型{}...{}",
                    self.config.retry_attempts, model, e
                );
                let user_prompt_with_fixer = with_previous_error(user_prompt, &e);
                // 备选模型同样享有完整的重试次数，但不再继续fallover
                Box::pin(self.complete_inner(system_prompt, &user_prompt_with_fixer, model, None))
                    .await
            }
            (Err(e), None) => {
                error!(
                    "❌ 调用模型服务出错，尝试 {} 次均失败...{}",
                    self.config.retry_attempts, e
                );
                Err(e)
            }
        }
    }
}

/// 通用重试逻辑：最多尝试 max_retries 次（至少一次），每次失败后等待 retry_delay_ms
async fn retry_with_backoff<T, F, Fut>(max_retries: u32, retry_delay_ms: u64, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, anyhow::Error>>,
{
    let max_retries = max_retries.max(1);
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                retries += 1;
                warn!(
                    "❌ 调用模型服务出错，重试中 (第 {} / {}次尝试): {}",
                    retries, max_retries, err
                );
                if retries >= max_retries {
                    return Err(err);
                }
                tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
            }
        }
    }
}

/// 把上一次失败的原因附加到用户提示词后
fn with_previous_error(user_prompt: &str, error: &anyhow::Error) -> String {
    format!(
        "{}\n\nNote: a previous attempt to answer this request failed with \"{}\". Avoid repeating that error.",
        user_prompt, error
    )
}

#[async_trait]
impl CompletionBackend for LLMClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let (befitting_model, fallover_model) =
            evaluate_befitting_model(&self.config, system_prompt, user_prompt);

        self.complete_inner(system_prompt, user_prompt, befitting_model, fallover_model)
            .await
    }
}
