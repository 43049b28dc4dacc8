//! Tavily 搜索服务适配器

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::SearchConfig;
use crate::search::{SearchError, SearchHit, SearchProvider, SearchRequest, SearchResponse};

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
    #[serde(default)]
    images: Vec<TavilyImage>,
}

/// 开启图片描述时返回对象，否则是纯链接
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TavilyImage {
    Url(String),
    Described {
        url: String,
        #[allow(dead_code)]
        #[serde(default)]
        description: Option<String>,
    },
}

impl TavilyImage {
    fn into_url(self) -> String {
        match self {
            TavilyImage::Url(url) => url,
            TavilyImage::Described { url, .. } => url,
        }
    }
}

impl From<TavilyResponse> for SearchResponse {
    fn from(response: TavilyResponse) -> Self {
        SearchResponse {
            results: response.results,
            images: response
                .images
                .into_iter()
                .map(TavilyImage::into_url)
                .collect(),
        }
    }
}

/// Tavily 搜索客户端
#[derive(Clone)]
pub struct TavilySearch {
    config: SearchConfig,
    http_client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        if self.config.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let body = TavilyRequest {
            query: &request.query,
            search_depth: &self.config.search_depth,
            max_results: request.max_results,
            include_images: request.include_images,
        };
        debug!("🔍 Tavily search: {}", request.query);

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TavilyResponse = response.json().await?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_plain_and_described_images() {
        let raw = r#"{
            "query": "kindle paperwhite",
            "answer": null,
            "images": [
                "https://img.example.com/a.jpg",
                {"url": "https://img.example.com/b.png", "description": "side view"}
            ],
            "results": [
                {"title": "Kindle Paperwhite review", "url": "https://example.com/review", "content": "Great screen", "score": 0.87}
            ],
            "response_time": 1.2
        }"#;

        let parsed: TavilyResponse = serde_json::from_str(raw).unwrap();
        let response: SearchResponse = parsed.into();

        assert_eq!(
            response.images,
            vec![
                "https://img.example.com/a.jpg".to_string(),
                "https://img.example.com/b.png".to_string()
            ]
        );
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].score, Some(0.87));
    }

    #[test]
    fn test_response_without_optional_fields() {
        let parsed: TavilyResponse = serde_json::from_str(r#"{"results": [{"url": "https://x"}]}"#).unwrap();
        let response: SearchResponse = parsed.into();
        assert!(response.images.is_empty());
        assert_eq!(response.results[0].title, "");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let search = TavilySearch::new(SearchConfig {
            base_url: "https://api.tavily.com/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(search.endpoint(), "https://api.tavily.com/search");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let search = TavilySearch::new(SearchConfig {
            api_key: String::new(),
            ..Default::default()
        })
        .unwrap();

        let result = search.search(&SearchRequest::new("anything", 1)).await;
        assert!(matches!(result, Err(SearchError::MissingApiKey)));
    }
}
