use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::llm::LLMClient;
use crate::pipeline::PipelineError;
use crate::pipeline::agents::price_comparison::{apply_price_comparison, skip_price_comparison};
use crate::pipeline::agents::{
    Formatter, ImageSearch, Manager, PriceComparisonAgent, Researcher, Specialist,
};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::stage_agent::Stage;
use crate::pipeline::state::{ShoppingState, StageTiming};
use crate::search::TavilySearch;
use crate::types::ResearchResponse;

/// 阶段计时
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<Stage, Instant>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, stage: Stage) {
        self.phase_start_times.insert(stage, Instant::now());
    }

    /// 结束一个阶段的计时，并记入状态
    pub fn end_phase(&mut self, stage: Stage, state: &mut ShoppingState) -> Option<Duration> {
        let duration = self.phase_start_times.remove(&stage)?.elapsed();
        info!("⏱️ {} 阶段耗时 {:.2}秒", stage, duration.as_secs_f64());
        state.stage_timings.push(StageTiming {
            stage: stage.to_string(),
            seconds: duration.as_secs_f64(),
        });
        Some(duration)
    }

    /// 获取总执行时间
    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// 购物调研流水线控制器
pub struct ShoppingPipeline {
    context: PipelineContext,
}

impl ShoppingPipeline {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    /// 按固定顺序执行全部阶段
    pub async fn run(&self, query: &str) -> Result<ShoppingState> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::EmptyQuery.into());
        }

        let mut state = ShoppingState::new(query);
        let progress = ProgressReporter::new(state.run_id, self.context.progress.clone());
        let mut timing = TimingScope::new();
        info!("🛒 开始调研: {} (run_id={})", query, state.run_id);

        self.plan_research(&mut state, &progress, &mut timing).await;
        self.research_products(&mut state, &progress, &mut timing)
            .await?;
        self.analyze_products(&mut state, &progress, &mut timing)
            .await;
        self.search_images(&mut state, &progress, &mut timing).await;
        self.compare_prices(&mut state, &progress, &mut timing)
            .await;
        self.format_response(&mut state, &progress, &mut timing)
            .await?;

        if state.final_response.is_none() {
            return Err(PipelineError::MissingResponse.into());
        }

        progress.emit(Stage::Complete, "Research complete!");
        info!(
            "✅ 调研完成，共 {} 个产品，{} 条警告，总耗时 {:.2}秒",
            state.detailed_reports.len(),
            state.warnings.len(),
            timing.total_duration().as_secs_f64()
        );
        Ok(state)
    }

    async fn plan_research(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) {
        if !self.context.config.pipeline.plan_research {
            return;
        }

        timing.start_phase(Stage::Manager);
        progress.emit(
            Stage::Manager,
            format!("Analyzing query '{}'", state.query),
        );
        let result = Manager.plan(&self.context, &state.query).await;
        match result {
            Ok(plan) => state.plan = Some(plan),
            Err(e) => record_warning(state, format!("Research planning failed: {:#}", e)),
        }
        timing.end_phase(Stage::Manager, state);
    }

    async fn research_products(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) -> Result<()> {
        timing.start_phase(Stage::Researcher);
        progress.emit(Stage::Researcher, "Searching the web for top products...");

        let mut candidates = Researcher
            .search_products(&self.context, &state.query, state.plan.as_ref())
            .await?;
        let found = candidates.len();
        let max_products = self.context.config.pipeline.max_products;
        candidates.truncate(max_products);

        progress.emit(
            Stage::Researcher,
            format!(
                "Found {} product candidates (capped at {})",
                found, max_products
            ),
        );
        state.product_candidates = candidates;
        timing.end_phase(Stage::Researcher, state);
        Ok(())
    }

    async fn analyze_products(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) {
        timing.start_phase(Stage::Specialist);
        let total = state.product_candidates.len();
        let candidates = state.product_candidates.clone();

        for (index, candidate) in candidates.iter().enumerate() {
            progress.emit(
                Stage::Specialist,
                format!("Analyzing {} ({}/{})", candidate.name, index + 1, total),
            );
            let result = Specialist
                .analyze_product(&self.context, candidate, state.plan.as_ref())
                .await;
            match result {
                Ok(product) => state.detailed_reports.push(product),
                Err(e) => record_warning(
                    state,
                    format!("Skipped {}: analysis failed: {:#}", candidate.name, e),
                ),
            }
        }
        timing.end_phase(Stage::Specialist, state);
    }

    async fn search_images(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) {
        timing.start_phase(Stage::ImageSearch);

        if !self.context.config.pipeline.enable_image_search {
            for product in state.detailed_reports.iter_mut() {
                product.image_url = None;
                product.image_urls.clear();
            }
            progress.emit(Stage::ImageSearch, "Image lookup skipped (disabled)");
            timing.end_phase(Stage::ImageSearch, state);
            return;
        }

        progress.emit(Stage::ImageSearch, "Searching for product images...");
        let mut warnings = Vec::new();
        for product in state.detailed_reports.iter_mut() {
            let result = ImageSearch.find_images(&self.context, &product.name).await;
            match result {
                Ok(images) => {
                    product.image_url = images.first().cloned();
                    product.image_urls = images;
                }
                Err(e) => warnings.push(format!(
                    "Image lookup failed for {}: {:#}",
                    product.name, e
                )),
            }
        }
        for warning in warnings {
            record_warning(state, warning);
        }
        timing.end_phase(Stage::ImageSearch, state);
    }

    async fn compare_prices(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) {
        timing.start_phase(Stage::PriceComparison);
        let pipeline = &self.context.config.pipeline;
        let max_checks = if pipeline.enable_price_comparison {
            pipeline.max_price_checks
        } else {
            0
        };

        progress.emit(
            Stage::PriceComparison,
            "Searching for best deals across retailers (limited)...",
        );

        let mut warnings = Vec::new();
        for (index, product) in state.detailed_reports.iter_mut().enumerate() {
            if index >= max_checks {
                progress.emit(
                    Stage::PriceComparison,
                    format!(
                        "Skipping price comparison for {} to reduce requests",
                        product.name
                    ),
                );
                skip_price_comparison(product);
                continue;
            }

            let result = PriceComparisonAgent
                .compare_prices(&self.context, &product.name)
                .await;
            match result {
                Ok(comparison) => {
                    if let Some(best) = apply_price_comparison(product, comparison) {
                        progress.emit(
                            Stage::PriceComparison,
                            format!("Best price for {}: ${:.2}", product.name, best),
                        );
                    }
                }
                Err(e) => {
                    // 保留Specialist给出的价格，最便宜链接退回产品链接
                    skip_price_comparison(product);
                    warnings.push(format!(
                        "Price comparison failed for {}: {:#}",
                        product.name, e
                    ));
                }
            }
        }
        for warning in warnings {
            record_warning(state, warning);
        }
        timing.end_phase(Stage::PriceComparison, state);
    }

    async fn format_response(
        &self,
        state: &mut ShoppingState,
        progress: &ProgressReporter,
        timing: &mut TimingScope,
    ) -> Result<()> {
        timing.start_phase(Stage::Formatter);
        progress.emit(Stage::Formatter, "Compiling final recommendation...");

        let final_recommendation = Formatter
            .format_results(&self.context, &state.query, &state.detailed_reports)
            .await?;

        state.final_response = Some(ResearchResponse {
            products: state.detailed_reports.clone(),
            final_recommendation,
        });
        timing.end_phase(Stage::Formatter, state);
        Ok(())
    }
}

fn record_warning(state: &mut ShoppingState, message: String) {
    warn!("⚠️ {}", message);
    state.warn(message);
}

/// 启动购物调研：检查模型连接、执行流水线并输出结果
pub async fn launch(config: &Config, query: &str) -> Result<ShoppingState> {
    let llm = LLMClient::new(config.llm.clone())?;

    // 启动时检查模型连接
    llm.check_connection().await?;

    let search = TavilySearch::new(config.search.clone())?;
    let context = PipelineContext::new(config.clone(), Arc::new(llm), Arc::new(search));
    let state = ShoppingPipeline::new(context).run(query).await?;

    crate::outlet::save(config, &state)?;
    Ok(state)
}
