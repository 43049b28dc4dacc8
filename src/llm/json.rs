//! 从模型的自由文本输出中提取JSON
//!
//! 模型经常在JSON前后附带解释、`<think>` 推理块或Markdown代码围栏，
//! 这里统一做清理，然后取出第一个可以完整解析的JSON对象或数组。

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde_json::Value;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think regex"));

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("valid code fence regex")
});

/// 移除 `<think>...</think>` 推理块
pub fn strip_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").into_owned()
}

/// 提取第一个完整的JSON对象或数组
pub fn extract_json(text: &str) -> Option<Value> {
    let cleaned = strip_think_blocks(text);

    // 代码围栏中的内容优先
    if let Some(captures) = CODE_FENCE.captures(&cleaned)
        && let Some(value) = first_json_value(&captures[1])
    {
        return Some(value);
    }

    first_json_value(&cleaned)
}

fn first_json_value(text: &str) -> Option<Value> {
    for (index, ch) in text.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(&text[index..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            return Some(value);
        }
    }
    None
}

/// 生成目标类型的JSON Schema说明，追加到系统提示词中约束模型输出
pub fn schema_instruction<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    let rendered = serde_json::to_string_pretty(&schema).unwrap_or_default();
    format!(
        "Respond with ONLY a JSON value that conforms to this JSON Schema. Do not include any <think> tags, markdown or explanation.\n```json\n{}\n```",
        rendered
    )
}
