use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::llm::json::{extract_json, schema_instruction};
use crate::pipeline::agents::describe_plan;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage_agent::{Material, PromptAgent, PromptTemplate, Stage};
use crate::types::{ProductCandidate, ResearchPlan};

/// Primary Researcher - 从搜索结果中找出最有希望的候选产品
#[derive(Default)]
pub struct Researcher;

impl PromptAgent for Researcher {
    fn stage(&self) -> Stage {
        Stage::Researcher
    }

    fn prompt_template(&self, context: &PipelineContext) -> PromptTemplate {
        let top_n = context.config.search.max_results;
        PromptTemplate {
            system_prompt: format!(
                "You are a Primary Researcher. Your goal is to identify the top {} promising products based on search results. Return ONLY a JSON array of objects with 'name' and 'url' keys.\n\n{}",
                top_n,
                schema_instruction::<Vec<ProductCandidate>>()
            ),
            opening_instruction: "Identify concrete, purchasable products from the research material below."
                .to_string(),
            closing_instruction: format!("List the top {} products found.", top_n),
        }
    }
}

impl Researcher {
    pub fn search_query(query: &str) -> String {
        format!("best {} reviews price", query)
    }

    pub async fn search_products(
        &self,
        context: &PipelineContext,
        query: &str,
        plan: Option<&ResearchPlan>,
    ) -> Result<Vec<ProductCandidate>> {
        let search_results = context
            .web_search(Self::search_query(query))
            .await
            .context("Researcher 网页搜索失败")?;

        let response = self
            .ask(
                context,
                vec![
                    Material::new("User Query", query),
                    Material::new("Research Plan", describe_plan(plan)),
                    Material::new(
                        "Search Results",
                        context.format_search_results(&search_results),
                    ),
                ],
            )
            .await?;

        match extract_json(&response) {
            Some(value) => Ok(parse_candidates(value)),
            None => {
                warn!("Researcher输出中没有JSON，视为未找到候选产品");
                Ok(Vec::new())
            }
        }
    }
}

/// 接受裸数组或 {"products": [...]}，丢弃没有名称的条目，并按名称去重
pub fn parse_candidates(value: Value) -> Vec<ProductCandidate> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let name = ["name", "product", "title"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|name| !name.is_empty())?
                .to_string();
            let url = map
                .get("url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            Some(ProductCandidate { name, url })
        })
        .filter(|candidate| seen.insert(candidate.name.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array() {
        let candidates = parse_candidates(json!([
            {"name": "Sony WH-1000XM5", "url": "https://a"},
            {"name": "Bose QC Ultra"}
        ]));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].url, "");
    }

    #[test]
    fn test_parse_wrapped_products_and_aliases() {
        let candidates = parse_candidates(json!({
            "products": [
                {"title": "Kindle Paperwhite", "url": "https://k"},
                {"url": "https://nameless"},
                {"name": "   "},
                "just a string"
            ]
        }));
        assert_eq!(
            candidates,
            vec![ProductCandidate {
                name: "Kindle Paperwhite".to_string(),
                url: "https://k".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_deduplicates_by_name() {
        let candidates = parse_candidates(json!([
            {"name": "AirPods Pro 2", "url": "https://apple"},
            {"name": "airpods pro 2", "url": "https://other"}
        ]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://apple");
    }

    #[test]
    fn test_parse_unexpected_shape() {
        assert!(parse_candidates(json!({"items": []})).is_empty());
        assert!(parse_candidates(json!("none")).is_empty());
    }

    #[test]
    fn test_search_query() {
        assert_eq!(
            Researcher::search_query("wireless headphones"),
            "best wireless headphones reviews price"
        );
    }
}
