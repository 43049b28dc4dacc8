use serde::{Deserialize, Serialize};

/// 目标语言类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "ru")]
    Russian,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Chinese => write!(f, "zh"),
            TargetLanguage::Japanese => write!(f, "ja"),
            TargetLanguage::Korean => write!(f, "ko"),
            TargetLanguage::German => write!(f, "de"),
            TargetLanguage::French => write!(f, "fr"),
            TargetLanguage::Russian => write!(f, "ru"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" | "英文" => Ok(TargetLanguage::English),
            "zh" | "chinese" | "中文" => Ok(TargetLanguage::Chinese),
            "ja" | "japanese" | "日本語" | "日文" => Ok(TargetLanguage::Japanese),
            "ko" | "korean" | "한국어" | "韩文" => Ok(TargetLanguage::Korean),
            "de" | "german" | "deutsch" | "德文" => Ok(TargetLanguage::German),
            "fr" | "french" | "français" | "法文" => Ok(TargetLanguage::French),
            "ru" | "russian" | "русский" | "俄文" => Ok(TargetLanguage::Russian),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Chinese => "中文",
            TargetLanguage::Japanese => "日本語",
            TargetLanguage::Korean => "한국어",
            TargetLanguage::German => "Deutsch",
            TargetLanguage::French => "Français",
            TargetLanguage::Russian => "Русский",
        }
    }

    /// 推荐语的语言指令，追加到Formatter的系统提示词后
    pub fn prompt_instruction(&self) -> &'static str {
        match self {
            TargetLanguage::English => "Write the recommendation in English.",
            TargetLanguage::Chinese => "请使用中文撰写推荐语，产品名称保持原文。",
            TargetLanguage::Japanese => {
                "推奨文は日本語で書いてください。製品名は原文のままにしてください。"
            }
            TargetLanguage::Korean => {
                "추천 문구는 한국어로 작성해 주세요. 제품명은 원문 그대로 유지해 주세요."
            }
            TargetLanguage::German => {
                "Schreiben Sie die Empfehlung auf Deutsch und behalten Sie die Produktnamen im Original bei."
            }
            TargetLanguage::French => {
                "Rédigez la recommandation en français en conservant les noms de produits d'origine."
            }
            TargetLanguage::Russian => {
                "Напишите рекомендацию на русском языке, сохранив оригинальные названия товаров."
            }
        }
    }

    /// Markdown报告中使用的小节标题
    pub fn report_label(&self, key: &str) -> String {
        let label = match (self, key) {
            (TargetLanguage::Chinese, "title") => "购物调研报告",
            (TargetLanguage::Chinese, "recommendation") => "推荐结论",
            (TargetLanguage::Chinese, "price") => "价格",
            (TargetLanguage::Chinese, "rating") => "评分",
            (TargetLanguage::Chinese, "pros") => "优点",
            (TargetLanguage::Chinese, "cons") => "缺点",
            (TargetLanguage::Chinese, "best_deal") => "最低价链接",
            (TargetLanguage::Chinese, "retailer") => "零售商",
            (TargetLanguage::Japanese, "title") => "ショッピング調査レポート",
            (TargetLanguage::Japanese, "recommendation") => "おすすめ",
            (TargetLanguage::Japanese, "price") => "価格",
            (TargetLanguage::Japanese, "rating") => "評価",
            (TargetLanguage::Japanese, "pros") => "長所",
            (TargetLanguage::Japanese, "cons") => "短所",
            (TargetLanguage::Japanese, "best_deal") => "最安値リンク",
            (TargetLanguage::Japanese, "retailer") => "販売店",
            (_, "title") => "Shopping Research Report",
            (_, "recommendation") => "Recommendation",
            (_, "price") => "Price",
            (_, "rating") => "Rating",
            (_, "pros") => "Pros",
            (_, "cons") => "Cons",
            (_, "best_deal") => "Best deal",
            (_, "retailer") => "Retailer",
            (_, other) => other,
        };
        label.to_string()
    }
}
