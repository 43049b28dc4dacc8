use anyhow::{Context, Result};
use serde_json::Value;

use crate::llm::json::{extract_json, schema_instruction, strip_think_blocks};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage_agent::{Material, PromptAgent, PromptTemplate, Stage};
use crate::types::{Product, Recommendation};

pub const FALLBACK_RECOMMENDATION: &str = "Here are the top products found.";

/// Formatter - 汇总产品报告，给出最终推荐语
#[derive(Default)]
pub struct Formatter;

impl PromptAgent for Formatter {
    fn stage(&self) -> Stage {
        Stage::Formatter
    }

    fn prompt_template(&self, context: &PipelineContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: format!(
                "You are Maven's Recommendation Engine. Create a CONCISE final recommendation (max 3-4 sentences) that names the best overall pick and, when relevant, a budget alternative. Use markdown for emphasis.\n{}\n\n{}",
                context.config.target_language.prompt_instruction(),
                schema_instruction::<Recommendation>()
            ),
            opening_instruction: "Write the final recommendation for the shopping query below.".to_string(),
            closing_instruction: "Return ONLY a JSON object with the key 'final_recommendation'.".to_string(),
        }
    }
}

impl Formatter {
    pub async fn format_results(
        &self,
        context: &PipelineContext,
        query: &str,
        products: &[Product],
    ) -> Result<String> {
        let reports = serde_json::to_string_pretty(products).context("序列化产品报告失败")?;

        let response = self
            .ask(
                context,
                vec![
                    Material::new("Query", query),
                    Material::new("Product Reports", reports),
                ],
            )
            .await?;

        Ok(recommendation_from_response(&response))
    }
}

/// 优先取JSON中的 final_recommendation；纯文本输出直接作为推荐语
pub fn recommendation_from_response(response: &str) -> String {
    let recommendation = match extract_json(response) {
        Some(Value::Object(map)) => map
            .get("final_recommendation")
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(_) => None,
        None => Some(strip_think_blocks(response)),
    };

    recommendation
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_RECOMMENDATION.to_string())
}
