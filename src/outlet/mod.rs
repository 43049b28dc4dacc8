//! 调研结果输出：JSON（文件或标准输出）与可选的Markdown报告

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::i18n::TargetLanguage;
use crate::pipeline::{PipelineError, ShoppingState};
use crate::types::{Product, ResearchResponse};

/// 保存调研结果
pub fn save(config: &Config, state: &ShoppingState) -> Result<()> {
    let response = state
        .final_response
        .as_ref()
        .ok_or(PipelineError::MissingResponse)?;

    JsonOutlet::new(config.output.json_path.clone()).save(response)?;

    if let Some(path) = &config.output.markdown_path {
        MarkdownOutlet::new(path.clone(), config.target_language).save(response)?;
    }
    Ok(())
}

pub trait Outlet {
    fn save(&self, response: &ResearchResponse) -> Result<()>;
}

/// JSON输出，未配置路径时写到标准输出
pub struct JsonOutlet {
    path: Option<PathBuf>,
}

impl JsonOutlet {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl Outlet for JsonOutlet {
    fn save(&self, response: &ResearchResponse) -> Result<()> {
        let content = serde_json::to_string_pretty(response)?;
        match &self.path {
            Some(path) => {
                write_file(path, &content)?;
                info!("💾 调研结果已保存到 {}", path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", content)?;
            }
        }
        Ok(())
    }
}

/// Markdown报告输出
pub struct MarkdownOutlet {
    path: PathBuf,
    language: TargetLanguage,
}

impl MarkdownOutlet {
    pub fn new(path: PathBuf, language: TargetLanguage) -> Self {
        Self { path, language }
    }
}

impl Outlet for MarkdownOutlet {
    fn save(&self, response: &ResearchResponse) -> Result<()> {
        write_file(&self.path, &render_markdown(response, self.language))?;
        info!("📝 Markdown报告已保存到 {}", self.path.display());
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("无法创建输出目录 {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("无法写入 {}", path.display()))
}

/// 渲染Markdown报告
pub fn render_markdown(response: &ResearchResponse, language: TargetLanguage) -> String {
    let mut report = format!("# {}\n\n", language.report_label("title"));

    report.push_str(&format!(
        "## {}\n\n{}\n\n",
        language.report_label("recommendation"),
        response.final_recommendation.trim()
    ));

    for product in &response.products {
        report.push_str(&render_product(product, language));
    }
    report
}

fn render_product(product: &Product, language: TargetLanguage) -> String {
    let mut section = if product.url.is_empty() {
        format!("## {}\n\n", product.name)
    } else {
        format!("## [{}]({})\n\n", product.name, product.url)
    };

    if let Some(image) = &product.image_url {
        section.push_str(&format!("![{}]({})\n\n", product.name, image));
    }

    section.push_str(&format!(
        "- **{}**: {}\n",
        language.report_label("price"),
        product.price
    ));
    if let Some(rating) = product.rating {
        let mut line = format!(
            "- **{}**: {:.1}/5",
            language.report_label("rating"),
            rating.value()
        );
        if let Some(count) = product.reviews_count {
            line.push_str(&format!(" ({})", count));
        }
        section.push_str(&line);
        section.push('\n');
    }
    if let Some(link) = &product.cheapest_link {
        section.push_str(&format!(
            "- **{}**: {}\n",
            language.report_label("best_deal"),
            link
        ));
    }
    section.push('\n');

    if let Some(why) = &product.why_to_buy {
        section.push_str(&format!("> {}\n\n", why));
    }

    for (key, items) in [("pros", &product.pros), ("cons", &product.cons)] {
        if items.is_empty() {
            continue;
        }
        section.push_str(&format!("### {}\n\n", language.report_label(key)));
        for item in items {
            section.push_str(&format!("- {}\n", item));
        }
        section.push('\n');
    }

    if !product.price_comparison.is_empty() {
        section.push_str(&format!(
            "| {} | {} |\n|---|---|\n",
            language.report_label("retailer"),
            language.report_label("price")
        ));
        for offer in &product.price_comparison {
            if offer.url.is_empty() {
                section.push_str(&format!("| {} | {} |\n", offer.retailer, offer.price));
            } else {
                section.push_str(&format!(
                    "| [{}]({}) | {} |\n",
                    offer.retailer, offer.url, offer.price
                ));
            }
        }
        section.push('\n');
    }

    section
}
