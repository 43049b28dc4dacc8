use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::llm::json::{extract_json, schema_instruction};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::stage_agent::{Material, PromptAgent, PromptTemplate, Stage};
use crate::types::{Price, PriceComparison, Product, RetailerPrice};

/// Price Comparison - 汇总多家零售商的报价
#[derive(Default)]
pub struct PriceComparisonAgent;

impl PromptAgent for PriceComparisonAgent {
    fn stage(&self) -> Stage {
        Stage::PriceComparison
    }

    fn prompt_template(&self, _context: &PipelineContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: format!(
                "You are a Price Comparison Specialist. Compare the prices different retailers offer for the product using only the search results. Return ONLY a JSON object with 'price_comparison' (a list of objects with 'retailer', 'price' and 'url') and 'cheapest_link'.\n\n{}",
                schema_instruction::<PriceComparison>()
            ),
            opening_instruction: "Find current retailer prices for the product below.".to_string(),
            closing_instruction: "List each retailer with its price and product link, then give the link to the cheapest offer.".to_string(),
        }
    }
}

impl PriceComparisonAgent {
    pub fn search_query(product_name: &str) -> String {
        format!("{} price buy online retailers", product_name)
    }

    pub async fn compare_prices(
        &self,
        context: &PipelineContext,
        product_name: &str,
    ) -> Result<PriceComparison> {
        let search_results = context
            .web_search(Self::search_query(product_name))
            .await
            .with_context(|| format!("搜索 {} 的报价失败", product_name))?;

        let response = self
            .ask(
                context,
                vec![
                    Material::new("Product", product_name),
                    Material::new(
                        "Search Results",
                        context.format_search_results(&search_results),
                    ),
                ],
            )
            .await?;

        match extract_json(&response) {
            Some(value) => Ok(parse_price_comparison(value)),
            None => {
                warn!("{} 的比价结果中没有JSON", product_name);
                Ok(PriceComparison::default())
            }
        }
    }
}

/// 宽松解析比价结果：接受完整对象或裸数组，丢弃缺少零售商或价格的条目
pub fn parse_price_comparison(value: Value) -> PriceComparison {
    let (entries, cheapest_link) = match value {
        Value::Array(items) => (items, String::new()),
        Value::Object(mut map) => {
            let cheapest_link = map
                .get("cheapest_link")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            let items = match map.remove("price_comparison").or_else(|| map.remove("prices")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            (items, cheapest_link)
        }
        _ => (Vec::new(), String::new()),
    };

    PriceComparison {
        price_comparison: entries.iter().filter_map(parse_retailer_price).collect(),
        cheapest_link,
    }
}

fn parse_retailer_price(item: &Value) -> Option<RetailerPrice> {
    let map = item.as_object()?;
    let retailer = ["retailer", "store", "seller"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty())?
        .to_string();
    let price = match map.get("price")? {
        Value::Number(n) => Price::Amount(n.as_f64()?),
        Value::String(text) if !text.trim().is_empty() => Price::Text(text.trim().to_string()),
        _ => return None,
    };
    let url = map
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    Some(RetailerPrice {
        retailer,
        price,
        url,
    })
}

/// 把比价结果写回产品，返回找到的最低价
///
/// 最低价会覆盖产品价格；模型没给出最便宜链接时，使用最低价零售商的链接，再退回产品链接。
pub fn apply_price_comparison(product: &mut Product, comparison: PriceComparison) -> Option<f64> {
    product.price_comparison = comparison.price_comparison;

    let lowest = product
        .lowest_retailer_price()
        .and_then(|p| p.amount().map(|amount| (amount, p.url.clone())));

    let cheapest_link = if !comparison.cheapest_link.is_empty() {
        comparison.cheapest_link
    } else {
        match &lowest {
            Some((_, url)) if !url.is_empty() => url.clone(),
            _ => product.url.clone(),
        }
    };
    product.cheapest_link = Some(cheapest_link).filter(|link| !link.is_empty());

    lowest.map(|(amount, _)| {
        product.price = Price::formatted(amount);
        amount
    })
}

/// 超出比价上限的产品：无报价，最便宜链接即产品链接
pub fn skip_price_comparison(product: &mut Product) {
    product.price_comparison.clear();
    product.cheapest_link = Some(product.url.clone()).filter(|link| !link.is_empty());
}
