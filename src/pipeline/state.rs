use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{Product, ProductCandidate, ResearchPlan, ResearchResponse};

/// 单个阶段的耗时
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: String,
    pub seconds: f64,
}

/// 在各阶段之间传递的共享状态
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingState {
    pub run_id: Uuid,
    pub query: String,
    pub started_at: DateTime<Utc>,
    /// Manager给出的调研计划
    pub plan: Option<ResearchPlan>,
    /// Researcher找到的候选产品（已按上限截断）
    pub product_candidates: Vec<ProductCandidate>,
    /// Specialist规整后的产品报告，后续阶段在其上补充图片与报价
    pub detailed_reports: Vec<Product>,
    pub final_response: Option<ResearchResponse>,
    /// 未中断流水线的局部失败
    pub warnings: Vec<String>,
    pub stage_timings: Vec<StageTiming>,
}

impl ShoppingState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: query.into(),
            started_at: Utc::now(),
            plan: None,
            product_candidates: Vec::new(),
            detailed_reports: Vec::new(),
            final_response: None,
            warnings: Vec::new(),
            stage_timings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
