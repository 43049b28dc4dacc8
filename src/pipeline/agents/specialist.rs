use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::warn;

use crate::llm::json::{extract_json, schema_instruction};
use crate::pipeline::agents::describe_plan;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::normalize::normalize_product;
use crate::pipeline::stage_agent::{Material, PromptAgent, PromptTemplate, Stage};
use crate::types::{Product, ProductCandidate, ResearchPlan};

/// Product Specialist - 对单个候选产品做深度分析
#[derive(Default)]
pub struct Specialist;

impl PromptAgent for Specialist {
    fn stage(&self) -> Stage {
        Stage::Specialist
    }

    fn prompt_template(&self, _context: &PipelineContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: format!(
                "You are a Product Specialist. Analyze the product deeply. Return ONLY a JSON object matching the Product model.\n\n{}",
                schema_instruction::<Product>()
            ),
            opening_instruction: "Analyze the product below using the research material.".to_string(),
            closing_instruction: "Provide a detailed analysis including price, rating, features, pros, cons, and a 'why to buy' summary.".to_string(),
        }
    }
}

impl Specialist {
    pub fn search_query(product_name: &str) -> String {
        format!("{} detailed review pros cons price", product_name)
    }

    pub async fn analyze_product(
        &self,
        context: &PipelineContext,
        candidate: &ProductCandidate,
        plan: Option<&ResearchPlan>,
    ) -> Result<Product> {
        let search_results = context
            .web_search(Self::search_query(&candidate.name))
            .await
            .with_context(|| format!("搜索 {} 的评测信息失败", candidate.name))?;

        let mut product_line = format!("Name: {}\n", candidate.name);
        if !candidate.url.is_empty() {
            product_line.push_str(&format!("URL: {}\n", candidate.url));
        }

        let response = self
            .ask(
                context,
                vec![
                    Material::new("Product", product_line),
                    Material::new("Research Plan", describe_plan(plan)),
                    Material::new(
                        "Search Results",
                        context.format_search_results(&search_results),
                    ),
                ],
            )
            .await?;

        let report = extract_json(&response).unwrap_or_else(|| {
            warn!("{} 的分析结果中没有JSON，使用候选信息兜底", candidate.name);
            Value::Object(Map::new())
        });

        let product = normalize_product(report, candidate);
        product
            .validate()
            .with_context(|| format!("{} 的分析结果未通过校验", candidate.name))?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query() {
        assert_eq!(
            Specialist::search_query("Kindle Paperwhite"),
            "Kindle Paperwhite detailed review pros cons price"
        );
    }
}
