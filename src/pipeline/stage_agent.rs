use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

use crate::pipeline::context::PipelineContext;

/// 流水线阶段（同时也是各Agent的类型标识）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Manager,
    Researcher,
    Specialist,
    ImageSearch,
    PriceComparison,
    Formatter,
    Complete,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Stage::Manager => "Manager",
            Stage::Researcher => "Researcher",
            Stage::Specialist => "Specialist",
            Stage::ImageSearch => "ImageSearch",
            Stage::PriceComparison => "PriceComparison",
            Stage::Formatter => "Formatter",
            Stage::Complete => "Complete",
        };
        write!(f, "{}", str)
    }
}

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

/// 调研材料：带标题的一段上下文
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub title: String,
    pub body: String,
}

impl Material {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// 标准的Prompt构建器：开头指令 + 调研材料 + 结尾指令
pub struct PromptBuilder {
    template: PromptTemplate,
    materials: Vec<Material>,
}

impl PromptBuilder {
    pub fn new(template: PromptTemplate) -> Self {
        Self {
            template,
            materials: Vec::new(),
        }
    }

    pub fn materials(mut self, materials: Vec<Material>) -> Self {
        self.materials.extend(materials);
        self
    }

    /// 构建（系统提示词，用户提示词）
    pub fn build(self) -> (String, String) {
        let mut prompt = String::new();

        prompt.push_str(&self.template.opening_instruction);
        prompt.push_str("\n\n");

        for material in &self.materials {
            // 空材料不写入，避免模型看到空标题
            if material.body.trim().is_empty() {
                continue;
            }
            prompt.push_str(&format!("## {}\n{}\n\n", material.title, material.body.trim_end()));
        }

        prompt.push_str(&self.template.closing_instruction);

        (self.template.system_prompt, prompt)
    }
}

/// 基于Prompt模板调用模型的Agent
#[async_trait]
pub trait PromptAgent: Send + Sync {
    /// Agent类型标识
    fn stage(&self) -> Stage;

    /// Prompt模板配置
    fn prompt_template(&self, context: &PipelineContext) -> PromptTemplate;

    /// 使用模板与调研材料调用模型，返回原始文本
    async fn ask(&self, context: &PipelineContext, materials: Vec<Material>) -> Result<String> {
        let (system_prompt, user_prompt) = PromptBuilder::new(self.prompt_template(context))
            .materials(materials)
            .build();

        debug!(
            "🤖 [{}] prompt长度: system={} user={}",
            self.stage(),
            system_prompt.len(),
            user_prompt.len()
        );

        let response = context
            .llm
            .complete(&system_prompt, &user_prompt)
            .await
            .with_context(|| format!("{} 调用模型失败", self.stage()))?;

        debug!("🤖 [{}] 模型返回 {} 字符", self.stage(), response.len());
        Ok(response)
    }
}
