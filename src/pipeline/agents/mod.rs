pub mod formatter;
pub mod image_search;
pub mod manager;
pub mod price_comparison;
pub mod researcher;
pub mod specialist;

pub use formatter::Formatter;
pub use image_search::ImageSearch;
pub use manager::Manager;
pub use price_comparison::PriceComparisonAgent;
pub use researcher::Researcher;
pub use specialist::Specialist;

use crate::types::ResearchPlan;

/// 把调研计划渲染成prompt材料
pub(crate) fn describe_plan(plan: Option<&ResearchPlan>) -> String {
    let Some(plan) = plan else {
        return String::new();
    };
    let mut content = format!("Query type: {}\n", plan.query_kind);
    if !plan.summary.trim().is_empty() {
        content.push_str(&format!("Intent: {}\n", plan.summary.trim()));
    }
    if !plan.key_features.is_empty() {
        content.push_str(&format!("Key features: {}\n", plan.key_features.join(", ")));
    }
    content
}
