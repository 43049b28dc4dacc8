//! 将Specialist输出的松散JSON规整为合法的 [`Product`]
//!
//! 模型给出的字段形状并不稳定：价格可能是对象，评分可能是 "4.5/5" 这样的字符串，
//! features 可能是键值表。这里逐字段收敛，保证产出的 Product 一定能通过校验。

use serde_json::{Map, Value};

use crate::types::product::first_number;
use crate::types::{Price, Product, ProductCandidate, Rating};

const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// 规整一份产品报告，缺失信息由候选产品补齐
pub fn normalize_product(report: Value, candidate: &ProductCandidate) -> Product {
    let mut fields = unwrap_product(report);

    // 有些模型用 "product" 代替 "name"
    if !fields.contains_key("name")
        && let Some(Value::String(name)) = fields.remove("product")
    {
        fields.insert("name".to_string(), Value::String(name));
    }

    let name = non_empty_string(fields.get("name"))
        .or_else(|| non_empty(&candidate.name))
        .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());

    let url = non_empty_string(fields.get("url")).unwrap_or_else(|| candidate.url.clone());

    Product {
        name,
        price: normalize_price(fields.get("price")),
        rating: Some(normalize_rating(fields.get("rating"))),
        reviews_count: normalize_reviews_count(fields.get("reviews_count")),
        features: normalize_features(fields.get("features")),
        pros: string_list(fields.get("pros")),
        cons: string_list(fields.get("cons")),
        url,
        why_to_buy: non_empty_string(fields.get("why_to_buy")),
        ..Default::default()
    }
}

fn unwrap_product(report: Value) -> Map<String, Value> {
    match report {
        Value::Object(mut map) => match map.remove("product") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                map.insert("product".to_string(), other);
                map
            }
            None => map,
        },
        // 数组时取第一个对象
        Value::Array(items) => items
            .into_iter()
            .find_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .map(|map| unwrap_product(Value::Object(map)))
            .unwrap_or_default(),
        _ => Map::new(),
    }
}

/// 价格：对象时依次取 starting、msrp、第一个数值
pub fn normalize_price(value: Option<&Value>) -> Price {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Price::Amount)
            .unwrap_or_else(|| Price::Text(Price::VARIES.to_string())),
        Some(Value::String(text)) if !text.trim().is_empty() => Price::Text(text.trim().to_string()),
        Some(Value::Object(map)) => ["starting", "msrp"]
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_price))
            .or_else(|| {
                map.values()
                    .find_map(|v| v.as_f64())
                    .map(Price::Amount)
            })
            .unwrap_or_else(|| Price::Text(Price::VARIES.to_string())),
        _ => Price::Text(Price::NOT_AVAILABLE.to_string()),
    }
}

fn scalar_price(value: &Value) -> Option<Price> {
    match value {
        Value::Number(n) => n.as_f64().map(Price::Amount),
        Value::String(text) if !text.trim().is_empty() => Some(Price::Text(text.trim().to_string())),
        _ => None,
    }
}

/// 评分：对象取 score 或第一个数值，字符串取其中第一个数字，最终收敛到 [1, 5]
pub fn normalize_rating(value: Option<&Value>) -> Rating {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(text)) => first_number(text),
        Some(Value::Object(map)) => map
            .get("score")
            .and_then(numeric)
            .or_else(|| map.values().find_map(|v| v.as_f64())),
        _ => None,
    };
    Rating::clamped(raw.unwrap_or(Rating::DEFAULT))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => first_number(text),
        _ => None,
    }
}

/// 评论数：字符串去掉千分位后取整数，对象与负数视为缺失
pub fn normalize_reviews_count(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.trunc() as u64)
        }),
        Some(Value::String(text)) => {
            let digits: String = text
                .replace(',', "")
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<u64>().ok()
        }
        _ => None,
    }
}

/// features：对象转为 "键: 值" 列表
pub fn normalize_features(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, display_value(value)))
            .collect(),
        other => string_list(other),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(display_value)
            .filter(|item| !item.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => non_empty(text),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> ProductCandidate {
        ProductCandidate {
            name: "Sony WH-1000XM5".to_string(),
            url: "https://example.com/sony".to_string(),
        }
    }

    #[test]
    fn test_unwraps_product_key_and_fills_from_candidate() {
        let report = json!({"product": {"price": 399.99, "pros": ["ANC"]}});
        let product = normalize_product(report, &candidate());

        assert_eq!(product.name, "Sony WH-1000XM5");
        assert_eq!(product.url, "https://example.com/sony");
        assert_eq!(product.price, Price::Amount(399.99));
        assert_eq!(product.pros, vec!["ANC".to_string()]);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_product_field_renamed_to_name() {
        let report = json!({"product": "Bose QC Ultra", "url": "https://bose.com/qc"});
        let product = normalize_product(report, &candidate());

        assert_eq!(product.name, "Bose QC Ultra");
        assert_eq!(product.url, "https://bose.com/qc");
    }

    #[test]
    fn test_empty_report_uses_defaults() {
        let product = normalize_product(json!({}), &candidate());

        assert_eq!(product.name, "Sony WH-1000XM5");
        assert_eq!(product.price, Price::Text(Price::NOT_AVAILABLE.to_string()));
        assert_eq!(product.rating, Some(Rating::clamped(Rating::DEFAULT)));
        assert!(product.features.is_empty());
        assert!(product.reviews_count.is_none());

        let nameless = ProductCandidate {
            name: " ".to_string(),
            url: String::new(),
        };
        assert_eq!(normalize_product(Value::Null, &nameless).name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn test_price_object_priority() {
        assert_eq!(
            normalize_price(Some(&json!({"msrp": 499, "starting": "$449"}))),
            Price::Text("$449".to_string())
        );
        assert_eq!(
            normalize_price(Some(&json!({"msrp": 499}))),
            Price::Amount(499.0)
        );
        assert_eq!(
            normalize_price(Some(&json!({"note": "sale", "current": 379.5}))),
            Price::Amount(379.5)
        );
        assert_eq!(
            normalize_price(Some(&json!({"note": "call"}))),
            Price::Text(Price::VARIES.to_string())
        );
        assert_eq!(
            normalize_price(None),
            Price::Text(Price::NOT_AVAILABLE.to_string())
        );
    }

    #[test]
    fn test_rating_shapes() {
        assert_eq!(normalize_rating(Some(&json!("4.5/5"))).value(), 4.5);
        assert_eq!(normalize_rating(Some(&json!("4.7 stars"))).value(), 4.7);
        assert_eq!(normalize_rating(Some(&json!({"score": "4.2"}))).value(), 4.2);
        assert_eq!(normalize_rating(Some(&json!({"avg": 3.9}))).value(), 3.9);
        assert_eq!(normalize_rating(Some(&json!(9.1))).value(), 5.0);
        assert_eq!(normalize_rating(Some(&json!(0))).value(), 1.0);
        assert_eq!(normalize_rating(Some(&json!("excellent"))).value(), 4.0);
        assert_eq!(normalize_rating(Some(&Value::Null)).value(), 4.0);
    }

    #[test]
    fn test_features_from_object() {
        let features = normalize_features(Some(&json!({"battery": "30h", "weight": 250})));
        assert_eq!(
            features,
            vec!["battery: 30h".to_string(), "weight: 250".to_string()]
        );
        assert!(normalize_features(Some(&json!("noise cancelling"))).is_empty());
    }

    #[test]
    fn test_reviews_count_shapes() {
        assert_eq!(normalize_reviews_count(Some(&json!("12,345 reviews"))), Some(12345));
        assert_eq!(normalize_reviews_count(Some(&json!(870))), Some(870));
        assert_eq!(normalize_reviews_count(Some(&json!(870.9))), Some(870));
        assert_eq!(normalize_reviews_count(Some(&json!(-3))), None);
        assert_eq!(normalize_reviews_count(Some(&json!({"amazon": 100}))), None);
        assert_eq!(normalize_reviews_count(Some(&json!("many"))), None);
    }

    #[test]
    fn test_pros_cons_non_list_dropped() {
        let report = json!({
            "name": "Kindle",
            "pros": "light",
            "cons": ["pricey", null, 3],
            "why_to_buy": "  Best e-reader for most people  "
        });
        let product = normalize_product(report, &candidate());

        assert!(product.pros.is_empty());
        assert_eq!(product.cons, vec!["pricey".to_string(), "3".to_string()]);
        assert_eq!(
            product.why_to_buy.as_deref(),
            Some("Best e-reader for most people")
        );
    }

    #[test]
    fn test_array_report_takes_first_object() {
        let report = json!(["noise", {"name": "AirPods Pro 2", "rating": 4.8}]);
        let product = normalize_product(report, &candidate());
        assert_eq!(product.name, "AirPods Pro 2");
        assert_eq!(product.rating.map(|r| r.value()), Some(4.8));
    }
}
