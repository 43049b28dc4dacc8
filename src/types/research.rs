use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::product::RetailerPrice;

/// Price Comparison 阶段的模型输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct PriceComparison {
    /// 各零售商报价
    #[serde(default)]
    pub price_comparison: Vec<RetailerPrice>,
    /// 最便宜的购买链接
    #[serde(default)]
    pub cheapest_link: String,
}

/// Formatter 阶段的模型输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    /// Markdown 格式的最终推荐语
    pub final_recommendation: String,
}
