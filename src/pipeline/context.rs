use std::sync::Arc;

use crate::config::Config;
use crate::llm::CompletionBackend;
use crate::pipeline::progress::{NullProgress, ProgressSink};
use crate::search::{SearchError, SearchProvider, SearchRequest, SearchResponse};

/// 流水线上下文：配置与各外部协作方
#[derive(Clone)]
pub struct PipelineContext {
    /// 配置
    pub config: Config,
    /// 文本补全后端
    pub llm: Arc<dyn CompletionBackend>,
    /// 网页搜索服务
    pub search: Arc<dyn SearchProvider>,
    /// 进度接收方
    pub progress: Arc<dyn ProgressSink>,
}

impl PipelineContext {
    pub fn new(
        config: Config,
        llm: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            config,
            llm,
            search,
            progress: Arc::new(NullProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// 按配置的结果数执行一次网页搜索
    pub async fn web_search(&self, query: String) -> Result<SearchResponse, SearchError> {
        let request = SearchRequest::new(query, self.config.search.max_results);
        self.search.search(&request).await
    }

    /// 搜索结果在prompt中的展示形式
    pub fn format_search_results(&self, response: &SearchResponse) -> String {
        response.to_prompt_context(self.config.search.max_content_chars)
    }
}
