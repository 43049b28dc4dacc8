//! rig Provider适配：把配置映射为具体的客户端，并构建单轮对话Agent

use anyhow::Result;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::Prompt,
    providers::gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
};

use crate::config::{LLMConfig, LLMProvider};

/// 按统一的参数补全Agent构建，所有阶段共用同一套采样设置
macro_rules! single_turn_agent {
    ($builder:expr, $system_prompt:expr, $config:expr) => {
        $builder
            .preamble($system_prompt)
            .max_tokens($config.max_tokens.into())
            .temperature($config.temperature)
            .build()
    };
}

/// 用户指定的API地址；空字符串表示使用Provider自带的默认地址
fn custom_base_url(config: &LLMConfig) -> Option<&str> {
    Some(config.api_base_url.trim()).filter(|url| !url.is_empty())
}

/// 各Provider的客户端
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Moonshot(rig::providers::moonshot::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Mistral(rig::providers::mistral::Client),
    OpenRouter(rig::providers::openrouter::Client),
    Anthropic(rig::providers::anthropic::Client),
    Gemini(rig::providers::gemini::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    pub fn new(config: &LLMConfig) -> Result<Self> {
        let key = config.api_key.as_str();
        let base_url = custom_base_url(config);

        let client = match config.provider {
            LLMProvider::OpenAI => {
                let builder = rig::providers::openai::Client::builder(key);
                let builder = match base_url {
                    Some(url) => builder.base_url(url),
                    None => builder,
                };
                ProviderClient::OpenAI(builder.build())
            }
            LLMProvider::Moonshot => {
                let builder = rig::providers::moonshot::Client::builder(key);
                let builder = match base_url {
                    Some(url) => builder.base_url(url),
                    None => builder,
                };
                ProviderClient::Moonshot(builder.build())
            }
            LLMProvider::DeepSeek => {
                let builder = rig::providers::deepseek::Client::builder(key);
                let builder = match base_url {
                    Some(url) => builder.base_url(url),
                    None => builder,
                };
                ProviderClient::DeepSeek(builder.build())
            }
            LLMProvider::Mistral => {
                ProviderClient::Mistral(rig::providers::mistral::Client::builder(key).build())
            }
            LLMProvider::OpenRouter => {
                ProviderClient::OpenRouter(rig::providers::openrouter::Client::builder(key).build())
            }
            LLMProvider::Anthropic => ProviderClient::Anthropic(
                rig::providers::anthropic::ClientBuilder::new(key).build()?,
            ),
            LLMProvider::Gemini => {
                ProviderClient::Gemini(rig::providers::gemini::Client::builder(key).build()?)
            }
            LLMProvider::Ollama => {
                ProviderClient::Ollama(rig::providers::ollama::Client::builder().build())
            }
        };
        Ok(client)
    }

    /// 创建不带工具的单轮Agent
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        config: &LLMConfig,
    ) -> Result<ProviderAgent> {
        let agent = match self {
            // OpenAI 走 chat completions 接口，兼容各类OpenAI协议的网关
            ProviderClient::OpenAI(client) => ProviderAgent::OpenAI(single_turn_agent!(
                client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder(),
                system_prompt,
                config
            )),
            ProviderClient::Moonshot(client) => {
                ProviderAgent::Moonshot(single_turn_agent!(client.agent(model), system_prompt, config))
            }
            ProviderClient::DeepSeek(client) => {
                ProviderAgent::DeepSeek(single_turn_agent!(client.agent(model), system_prompt, config))
            }
            ProviderClient::Mistral(client) => {
                ProviderAgent::Mistral(single_turn_agent!(client.agent(model), system_prompt, config))
            }
            ProviderClient::OpenRouter(client) => ProviderAgent::OpenRouter(single_turn_agent!(
                client.agent(model),
                system_prompt,
                config
            )),
            ProviderClient::Anthropic(client) => ProviderAgent::Anthropic(single_turn_agent!(
                client.agent(model),
                system_prompt,
                config
            )),
            ProviderClient::Gemini(client) => {
                let params = AdditionalParameters::default().with_config(GenerationConfig::default());
                ProviderAgent::Gemini(single_turn_agent!(
                    client
                        .agent(model)
                        .additional_params(serde_json::to_value(params)?),
                    system_prompt,
                    config
                ))
            }
            ProviderClient::Ollama(client) => {
                ProviderAgent::Ollama(single_turn_agent!(client.agent(model), system_prompt, config))
            }
        };
        Ok(agent)
    }
}

pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Moonshot(Agent<rig::providers::moonshot::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Mistral(Agent<rig::providers::mistral::CompletionModel>),
    OpenRouter(Agent<rig::providers::openrouter::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    Gemini(Agent<rig::providers::gemini::completion::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 单轮prompt，返回模型的原始文本
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        let text = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await?,
            ProviderAgent::Moonshot(agent) => agent.prompt(prompt).await?,
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await?,
            ProviderAgent::Mistral(agent) => agent.prompt(prompt).await?,
            ProviderAgent::OpenRouter(agent) => agent.prompt(prompt).await?,
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await?,
            ProviderAgent::Gemini(agent) => agent.prompt(prompt).await?,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await?,
        };
        Ok(text)
    }
}
