use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use crate::llm::json::{extract_json, schema_instruction, strip_think_blocks};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage_agent::{Material, PromptAgent, PromptTemplate, Stage};
use crate::types::{QueryKind, ResearchPlan};

/// Manager - 理解用户需求，为调研团队制定计划
#[derive(Default)]
pub struct Manager;

impl PromptAgent for Manager {
    fn stage(&self) -> Stage {
        Stage::Manager
    }

    fn prompt_template(&self, _context: &PipelineContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: format!(
                "You are the Manager of a shopping assistant team. Your goal is to understand the user's request and direct the research team.\n\n{}",
                schema_instruction::<ResearchPlan>()
            ),
            opening_instruction: "Analyze the shopping query below.".to_string(),
            closing_instruction: "Is it a specific product search or a category search? What are the key features to look for?".to_string(),
        }
    }
}

impl Manager {
    pub async fn plan(&self, context: &PipelineContext, query: &str) -> Result<ResearchPlan> {
        let response = self
            .ask(context, vec![Material::new("User Query", query)])
            .await?;
        Ok(plan_from_response(&response))
    }
}

/// 从Manager输出中构建调研计划
///
/// JSON对象按字段宽松读取；没有JSON时保留模型的自由文本作为摘要。
pub fn plan_from_response(response: &str) -> ResearchPlan {
    match extract_json(response) {
        Some(Value::Object(map)) => {
            let query_kind = map
                .get("query_kind")
                .or_else(|| map.get("query_type"))
                .and_then(Value::as_str)
                .map(QueryKind::from_label)
                .unwrap_or_default();
            let key_features = match map.get("key_features") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|feature| !feature.is_empty())
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(text)) => text
                    .split(',')
                    .map(str::trim)
                    .filter(|feature| !feature.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            let summary = ["summary", "intent"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .unwrap_or_default()
                .trim()
                .to_string();
            ResearchPlan {
                query_kind,
                key_features,
                summary,
            }
        }
        _ => {
            warn!("Manager输出中没有调研计划对象，使用文本摘要");
            ResearchPlan {
                query_kind: QueryKind::Category,
                key_features: Vec::new(),
                summary: strip_think_blocks(response).trim().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_with_capitalized_query_kind() {
        let plan = plan_from_response(
            r#"{"query_kind": "Category", "key_features": ["anc", "battery"], "summary": "ANC headphones"}"#,
        );
        assert_eq!(plan.query_kind, QueryKind::Category);
        assert_eq!(plan.key_features, vec!["anc".to_string(), "battery".to_string()]);
        assert_eq!(plan.summary, "ANC headphones");
    }

    #[test]
    fn test_plan_with_missing_and_loose_fields() {
        let plan = plan_from_response(
            "```json\n{\"query_type\": \"Specific product\", \"key_features\": \"price, battery life\"}\n```",
        );
        assert_eq!(plan.query_kind, QueryKind::Specific);
        assert_eq!(
            plan.key_features,
            vec!["price".to_string(), "battery life".to_string()]
        );
        assert!(plan.summary.is_empty());

        let plan = plan_from_response(r#"{"key_features": ["weight", 3]}"#);
        assert_eq!(plan.query_kind, QueryKind::Category);
        assert_eq!(plan.key_features, vec!["weight".to_string()]);
    }

    #[test]
    fn test_plan_falls_back_to_text() {
        let plan = plan_from_response(
            "<think>hmm</think>\nThis is a category search focused on comfort.",
        );
        assert_eq!(plan.query_kind, QueryKind::Category);
        assert!(plan.key_features.is_empty());
        assert_eq!(plan.summary, "This is a category search focused on comfort.");
    }
}
