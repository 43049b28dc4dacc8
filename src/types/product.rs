use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// 产品数据校验错误
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    #[error("rating {0} is outside the 1.0-5.0 range")]
    RatingOutOfRange(f64),
    #[error("product name is empty")]
    EmptyName,
    #[error("image url is not an http(s) url: {0}")]
    InvalidImageUrl(String),
}

/// 产品评分，取值范围固定为 [1.0, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;
    /// 模型未给出有效评分时使用的默认值
    pub const DEFAULT: f64 = 4.0;

    pub fn new(value: f64) -> Result<Self, ProductError> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProductError::RatingOutOfRange(value))
        }
    }

    /// 将任意数值收敛到合法区间，NaN 回落为默认评分
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::DEFAULT);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for Rating {
    type Error = ProductError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl JsonSchema for Rating {
    fn schema_name() -> Cow<'static, str> {
        "Rating".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "number",
            "minimum": Rating::MIN,
            "maximum": Rating::MAX,
            "description": "Average user rating between 1.0 and 5.0"
        })
    }
}

/// 价格：可以是数值，也可以是模型给出的原始文本（如 "Price varies"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl Price {
    pub const NOT_AVAILABLE: &'static str = "Price not available";
    pub const VARIES: &'static str = "Price varies";

    /// 尝试解析出数值价格，文本中的千分位逗号会被忽略
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(value) if value.is_finite() => Some(*value),
            Price::Amount(_) => None,
            Price::Text(text) => first_number(text),
        }
    }

    /// 统一的美元展示格式
    pub fn formatted(amount: f64) -> Self {
        Price::Text(format!("${:.2}", amount))
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(Self::NOT_AVAILABLE.to_string())
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Amount(value) => write!(f, "${:.2}", value),
            Price::Text(text) => write!(f, "{}", text),
        }
    }
}

/// 从 "$1,299.99"、"4.5/5" 之类的文本中提取第一个数值，千分位逗号会被忽略
pub fn first_number(text: &str) -> Option<f64> {
    let without_commas = text.replace(',', "");
    FIRST_NUMBER
        .find(&without_commas)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// 单个零售商的报价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RetailerPrice {
    /// 零售商名称
    pub retailer: String,
    pub price: Price,
    /// 商品在该零售商处的链接
    #[serde(default)]
    pub url: String,
}

impl RetailerPrice {
    pub fn amount(&self) -> Option<f64> {
        self.price.amount()
    }
}

/// Researcher 阶段产出的候选产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductCandidate {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// 查询类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// 用户点名了某个具体产品
    #[serde(alias = "Specific", alias = "SPECIFIC", alias = "specific product search")]
    Specific,
    /// 用户在某个品类中寻找推荐
    #[default]
    #[serde(alias = "Category", alias = "CATEGORY", alias = "category search")]
    Category,
}

impl QueryKind {
    /// 宽松识别模型给出的查询类型，无法识别时视为品类搜索
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("specific") {
            QueryKind::Specific
        } else {
            QueryKind::Category
        }
    }
}

impl Display for QueryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::Specific => write!(f, "specific product search"),
            QueryKind::Category => write!(f, "category search"),
        }
    }
}

/// Manager 阶段产出的调研计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ResearchPlan {
    #[serde(default)]
    pub query_kind: QueryKind,
    /// 需要重点关注的产品特性
    #[serde(default)]
    pub key_features: Vec<String>,
    /// 对用户意图的简要说明
    #[serde(default)]
    pub summary: String,
}

/// 经过规整与增强后的产品报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub reviews_count: Option<u64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub url: String,
    /// 一句话购买理由
    #[serde(default)]
    pub why_to_buy: Option<String>,

    // 以下字段由流水线后续阶段填充，不要求模型输出
    #[schemars(skip)]
    #[serde(default)]
    pub image_url: Option<String>,
    #[schemars(skip)]
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[schemars(skip)]
    #[serde(default)]
    pub price_comparison: Vec<RetailerPrice>,
    #[schemars(skip)]
    #[serde(default)]
    pub cheapest_link: Option<String>,
}

impl Product {
    /// 校验产品是否满足输出约束
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if let Some(rating) = self.rating {
            Rating::new(rating.value())?;
        }
        for url in self.image_url.iter().chain(self.image_urls.iter()) {
            if !is_http_url(url) {
                return Err(ProductError::InvalidImageUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// 所有可解析零售商报价中的最低价
    pub fn lowest_retailer_price(&self) -> Option<&RetailerPrice> {
        self.price_comparison
            .iter()
            .filter_map(|p| p.amount().map(|amount| (amount, p)))
            .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, p)| p)
    }
}

pub fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// 流水线最终输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub products: Vec<Product>,
    pub final_recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1.0).is_ok());
        assert!(Rating::new(5.0).is_ok());
        assert_eq!(Rating::new(5.5), Err(ProductError::RatingOutOfRange(5.5)));
        assert!(Rating::new(0.0).is_err());
        assert!(Rating::new(f64::NAN).is_err());
    }

    #[test]
    fn test_rating_clamped() {
        assert_eq!(Rating::clamped(9.0).value(), 5.0);
        assert_eq!(Rating::clamped(-3.0).value(), 1.0);
        assert_eq!(Rating::clamped(f64::NAN).value(), Rating::DEFAULT);
        assert_eq!(Rating::clamped(4.2).value(), 4.2);
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4.5").is_ok());
        assert!(serde_json::from_str::<Rating>("7.0").is_err());
    }

    #[test]
    fn test_price_amount_parsing() {
        assert_eq!(Price::Text("$1,299.99".to_string()).amount(), Some(1299.99));
        assert_eq!(Price::Text("From 349 USD".to_string()).amount(), Some(349.0));
        assert_eq!(Price::Text(Price::VARIES.to_string()).amount(), None);
        assert_eq!(Price::Amount(19.5).amount(), Some(19.5));
    }

    #[test]
    fn test_price_untagged_serde() {
        let number: Price = serde_json::from_str("199.0").unwrap();
        assert_eq!(number, Price::Amount(199.0));
        let text: Price = serde_json::from_str("\"$199\"").unwrap();
        assert_eq!(text, Price::Text("$199".to_string()));
        assert_eq!(Price::formatted(12.5).to_string(), "$12.50");
    }

    #[test]
    fn test_query_kind_aliases() {
        let plan: ResearchPlan =
            serde_json::from_str(r#"{"query_kind": "Specific", "key_features": ["anc"]}"#).unwrap();
        assert_eq!(plan.query_kind, QueryKind::Specific);

        let plan: ResearchPlan = serde_json::from_str(r#"{"summary": "headphones"}"#).unwrap();
        assert_eq!(plan.query_kind, QueryKind::Category);

        assert_eq!(QueryKind::from_label("Specific Product"), QueryKind::Specific);
        assert_eq!(QueryKind::from_label("broad"), QueryKind::Category);
    }

    #[test]
    fn test_product_validate() {
        let mut product = Product {
            name: "Sony WH-1000XM5".to_string(),
            ..Default::default()
        };
        assert!(product.validate().is_ok());

        product.image_urls = vec!["data:image/png;base64,xyz".to_string()];
        assert!(matches!(
            product.validate(),
            Err(ProductError::InvalidImageUrl(_))
        ));

        product.image_urls.clear();
        product.name = "  ".to_string();
        assert_eq!(product.validate(), Err(ProductError::EmptyName));
    }

    #[test]
    fn test_lowest_retailer_price() {
        let product = Product {
            name: "Kindle".to_string(),
            price_comparison: vec![
                RetailerPrice {
                    retailer: "Amazon".to_string(),
                    price: Price::Text("$129.99".to_string()),
                    url: "https://amazon.com/kindle".to_string(),
                },
                RetailerPrice {
                    retailer: "Best Buy".to_string(),
                    price: Price::Amount(119.0),
                    url: "https://bestbuy.com/kindle".to_string(),
                },
                RetailerPrice {
                    retailer: "Unknown".to_string(),
                    price: Price::Text("call for price".to_string()),
                    url: String::new(),
                },
            ],
            ..Default::default()
        };

        let lowest = product.lowest_retailer_price().unwrap();
        assert_eq!(lowest.retailer, "Best Buy");
    }

    #[test]
    fn test_product_schema_skips_pipeline_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(Product)).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("pros"));
        assert!(!properties.contains_key("price_comparison"));
        assert!(!properties.contains_key("image_urls"));
    }
}
