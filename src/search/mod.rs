//! 网页搜索访问层

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod tavily;

pub use tavily::TavilySearch;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search api key is not configured")]
    MissingApiKey,
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search service returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// 一次搜索请求
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub include_images: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            include_images: false,
        }
    }

    pub fn with_images(mut self) -> Self {
        self.include_images = true;
        self
    }
}

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    /// 图片链接，仅在请求图片时返回
    pub images: Vec<String>,
}

impl SearchResponse {
    /// 将搜索结果格式化为prompt中的调研材料
    pub fn to_prompt_context(&self, max_chars_per_hit: usize) -> String {
        if self.results.is_empty() {
            return "(no search results)\n".to_string();
        }

        let mut content = String::new();
        for (i, hit) in self.results.iter().enumerate() {
            content.push_str(&format!("{}. {}\n   URL: {}\n", i + 1, hit.title, hit.url));
            let snippet = truncate_chars(hit.content.trim(), max_chars_per_hit);
            if !snippet.is_empty() {
                content.push_str(&format!("   {}\n", snippet));
            }
        }
        content
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// 网页搜索服务
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}
