use crate::config::{Config, LLMProvider};
use crate::i18n::TargetLanguage;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Maven-RS - 由Rust与AI驱动的购物调研助手
#[derive(Parser, Debug)]
#[command(name = "maven-rs")]
#[command(
    about = "AI shopping research assistant. A team of LLM agents searches the web, analyzes the top products, compares retailer prices and writes a concise buying recommendation."
)]
#[command(version)]
pub struct Args {
    /// 购物需求，例如 "wireless earbuds under $200"
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON结果输出路径，不指定时打印到标准输出
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Markdown报告输出路径
    #[arg(short, long)]
    pub markdown: Option<PathBuf>,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 高能效模型，用于常规的解析与规划任务
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于超长上下文，以及作为efficient失效情况下的兜底
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 搜索服务 API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 进入深度分析的候选产品上限
    #[arg(long)]
    pub max_products: Option<usize>,

    /// 执行比价的产品上限
    #[arg(long)]
    pub max_price_checks: Option<usize>,

    /// 跳过图片查找
    #[arg(long)]
    pub skip_images: bool,

    /// 跳过多零售商比价
    #[arg(long)]
    pub skip_price_comparison: bool,

    /// 跳过Manager的调研规划
    #[arg(long)]
    pub skip_planning: bool,

    /// 目标语言 (zh, en, ja, ko, de, fr, ru)
    #[arg(long)]
    pub target_language: Option<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 拼接后的购物需求
    pub fn query(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    /// 将CLI参数转换为配置，命令行参数覆盖配置文件
    pub fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(output) = self.output {
            config.output.json_path = Some(output);
        }
        if let Some(markdown) = self.markdown {
            config.output.markdown_path = Some(markdown);
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用 {}",
                    provider_str, config.llm.provider
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 搜索与流水线配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(max_products) = self.max_products {
            config.pipeline.max_products = max_products;
        }
        if let Some(max_price_checks) = self.max_price_checks {
            config.pipeline.max_price_checks = max_price_checks;
        }
        if self.skip_images {
            config.pipeline.enable_image_search = false;
        }
        if self.skip_price_comparison {
            config.pipeline.enable_price_comparison = false;
        }
        if self.skip_planning {
            config.pipeline.plan_research = false;
        }

        // 目标语言配置
        if let Some(target_language_str) = self.target_language {
            if let Ok(target_language) = target_language_str.parse::<TargetLanguage>() {
                config.target_language = target_language;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用 {}",
                    target_language_str,
                    config.target_language.display_name()
                );
            }
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
