use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::pipeline::context::PipelineContext;
use crate::search::SearchRequest;
use crate::types::product::is_http_url;

/// Image Search - 为产品查找展示图片，不调用模型
#[derive(Default)]
pub struct ImageSearch;

impl ImageSearch {
    pub fn search_query(product_name: &str) -> String {
        format!("{} product image", product_name)
    }

    /// 返回去重后的图片链接，数量不超过 max_images
    pub async fn find_images(&self, context: &PipelineContext, product_name: &str) -> Result<Vec<String>> {
        let request = SearchRequest::new(
            Self::search_query(product_name),
            context.config.search.max_results,
        )
        .with_images();

        let response = context
            .search
            .search(&request)
            .await
            .with_context(|| format!("搜索 {} 的图片失败", product_name))?;

        Ok(select_images(
            response.images,
            context.config.pipeline.max_images,
        ))
    }
}

/// 只保留 http(s) 链接，去重并截断
pub fn select_images(images: Vec<String>, max_images: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    images
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| is_http_url(url))
        .filter(|url| seen.insert(url.clone()))
        .take(max_images)
        .collect()
}
