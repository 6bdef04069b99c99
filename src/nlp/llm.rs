//! Batch annotation through an OpenAI-compatible chat-completions endpoint.

use crate::core::config::ClassifierConfig;
use crate::nlp::catalog::{assign_category, NO_SPECIFIC_PRODUCT, OTHERS, PRODUCT_CATEGORIES};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Longest text (in chars) sent per row.
pub const MAX_TEXT_CHARS: usize = 1000;

pub const SUBTOPICS: &[&str] = &[
    "Contest",
    "Events",
    "Information",
    "Competitor",
    "Agent",
    "Promo",
    "Price / Purchase Inquiry",
    "Recommendation",
    "Shipping",
    "Warranty",
    "Accessories",
    "Software",
    "Camera",
    "Screen / Display",
    "AI",
    "Battery / Charging",
    "Account",
    "Performance",
    "Connectivity / Network",
    "Audio / Calls",
    "Storage / Memory",
    "Design",
    "Apps",
    "Others",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub ss_product: String,
    pub product_category: String,
    pub sentiment: String,
    pub topic: String,
    pub subtopic: String,
    pub brand_terms: Vec<String>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            ss_product: NO_SPECIFIC_PRODUCT.to_string(),
            product_category: OTHERS.to_string(),
            sentiment: "Neutral".to_string(),
            topic: OTHERS.to_string(),
            subtopic: OTHERS.to_string(),
            brand_terms: Vec::new(),
        }
    }
}

/// Anything that can label a batch of texts, one annotation per text.
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, texts: &[String]) -> Result<Vec<Annotation>>;

    fn model_name(&self) -> &str;
}

pub fn system_prompt() -> &'static str {
    static PROMPT: OnceLock<String> = OnceLock::new();
    PROMPT.get_or_init(|| {
        let categories = PRODUCT_CATEGORIES
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",");
        let subtopics = SUBTOPICS
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"You are an expert annotator of Samsung Members / Samsung Community forum posts.
Return ONLY a valid JSON object with key "items" = array of results.
Each array element MUST be an object with keys:
- i: integer index of the input line
- ss_product: most specific Samsung product model discussed (e.g. "Galaxy S24 Ultra"). If none, "No specific product".
- product_category: one of [{categories}]
- subtopic: choose EXACTLY one from: [{subtopics}]
- topic: choose based on subtopic (EXACT strings):
  * Contest -> "Contest"
  * Events, Information -> "News"
  * Competitor -> "Competitor"
  * Promo -> "Promo"
  * Price / Purchase Inquiry, Recommendation, Shipping -> "Purchase & Orders"
  * Agent -> "Service"
  * Warranty, Accessories, Software, Camera, Screen / Display, AI, Battery / Charging, Account,
    Performance, Connectivity / Network, Audio / Calls, Storage / Memory, Design, Apps
    -> "Product (Support)"
  * If the post is a review / test / general impressions and does NOT contain help-seeking cues
    ("how to","please help","need help","need advice","seek support","bug","fix","error code","is it possible")
    -> "Product (General)"
  * Otherwise -> "Others"
- sentiment: one of ["Positive","Negative","Neutral","Mix"]
  * Neutral = factual/informative/acknowledgment only
  * Mix = clear positive AND negative cues (esp. with connectors "but","however","though","although","yet","nevertheless","still")
- brand_terms: array of Samsung products/families/categories mentioned (deduplicate; keep specificity)

Guardrails:
1) Decide subtopic first, then topic from mapping.
2) Be as specific as possible for ss_product; do not output generic "Smartphone" if a model can be inferred.
3) brand_terms should include ALL relevant Samsung product mentions, not only the main one.
4) Output JSON only."#
        )
    })
}

/// `[i] text` lines, each text clipped to `MAX_TEXT_CHARS`.
pub fn numbered_batch(texts: &[String]) -> String {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!("[{}] {}", i, t.chars().take(MAX_TEXT_CHARS).collect::<String>()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A JSON `null` takes the default, same as a missing key.
fn field_str(item: &Value, key: &str, default: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Row index of an item. Fractional numbers truncate toward zero; strings
/// must hold an integer.
fn item_index(item: &Value) -> Option<usize> {
    match item.get("i")? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn annotation_from_item(item: &Value) -> Annotation {
    let ss_product = field_str(item, "ss_product", "");
    let model_category = field_str(item, "product_category", "");
    let product_category = if !ss_product.is_empty() && ss_product != NO_SPECIFIC_PRODUCT {
        assign_category(&ss_product).to_string()
    } else if !model_category.is_empty() {
        model_category
    } else {
        OTHERS.to_string()
    };

    let brand_terms = item
        .get("brand_terms")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Annotation {
        ss_product,
        product_category,
        sentiment: field_str(item, "sentiment", "Neutral"),
        topic: field_str(item, "topic", OTHERS),
        subtopic: field_str(item, "subtopic", OTHERS),
        brand_terms,
    }
}

/// Align the model's `{"items":[...]}` reply with `n` inputs by `i`.
/// Unparsable content or missing indices yield default annotations.
pub fn parse_annotations(content: &str, n: usize) -> Vec<Annotation> {
    let mut by_index: HashMap<usize, Annotation> = HashMap::new();
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        if let Some(items) = value.get("items").and_then(Value::as_array) {
            for item in items {
                if let Some(i) = item_index(item) {
                    by_index.insert(i, annotation_from_item(item));
                }
            }
        }
    }
    (0..n)
        .map(|i| by_index.remove(&i).unwrap_or_default())
        .collect()
}

pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    pub fn from_config(cfg: &ClassifierConfig, model_override: Option<String>) -> Result<Self> {
        Self::new(
            cfg.resolve_base_url(),
            cfg.resolve_api_key(),
            model_override.unwrap_or_else(|| cfg.resolve_model()),
        )
    }
}

#[async_trait]
impl Annotator for LlmClient {
    async fn annotate(&self, texts: &[String]) -> Result<Vec<Annotation>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": system_prompt()},
                {"role": "user", "content": format!(
                    "Classify these lines and return JSON with key 'items'. Align using 'i':\n\n{}",
                    numbered_batch(texts)
                )}
            ]
        });

        let builder = self.http.post(url).json(&body);
        // Key-less local endpoints work without the header.
        let builder = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => builder.bearer_auth(key),
            _ => builder,
        };
        let response = builder
            .send()
            .await
            .context("chat.completions request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "chat.completions failed: status={} body={}",
                status,
                text
            ));
        }

        let value: Value = response
            .json()
            .await
            .context("chat.completions response json parse failed")?;

        let content = value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or_default();

        Ok(parse_annotations(content, texts.len()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_are_aligned_by_index() {
        let content = r#"{"items":[
            {"i":1,"ss_product":"Galaxy S24 Ultra","product_category":"Others","sentiment":"Negative",
             "topic":"Product (Support)","subtopic":"Battery / Charging","brand_terms":["Galaxy S24 Ultra","One UI"]},
            {"i":"0","ss_product":"No specific product","product_category":"Galaxy Watch","sentiment":"Positive",
             "topic":"News","subtopic":"Events","brand_terms":"not a list"},
            {"i":"x","ss_product":"ignored"}
        ]}"#;
        let out = parse_annotations(content, 3);
        assert_eq!(out.len(), 3);

        assert_eq!(out[1].product_category, "Galaxy S");
        assert_eq!(out[1].subtopic, "Battery / Charging");
        assert_eq!(out[1].brand_terms, vec!["Galaxy S24 Ultra", "One UI"]);

        assert_eq!(out[0].product_category, "Galaxy Watch");
        assert_eq!(out[0].sentiment, "Positive");
        assert!(out[0].brand_terms.is_empty());

        assert_eq!(out[2], Annotation::default());
    }

    #[test]
    fn garbage_reply_defaults_every_row() {
        let out = parse_annotations("sorry, I can't", 2);
        assert_eq!(out, vec![Annotation::default(), Annotation::default()]);
    }

    #[test]
    fn missing_fields_fall_back() {
        let out = parse_annotations(r#"{"items":[{"i":0}]}"#, 1);
        assert_eq!(out[0].ss_product, "");
        assert_eq!(out[0].product_category, "Others");
        assert_eq!(out[0].sentiment, "Neutral");
    }

    #[test]
    fn fractional_index_truncates_and_null_fields_take_defaults() {
        let content = r#"{"items":[
            {"i":1.5,"ss_product":"Galaxy Buds3","sentiment":null,"topic":null},
            {"i":"0.5","ss_product":"ignored"},
            {"i":-1,"ss_product":"ignored"}
        ]}"#;
        let out = parse_annotations(content, 2);
        assert_eq!(out[1].ss_product, "Galaxy Buds3");
        assert_eq!(out[1].sentiment, "Neutral");
        assert_eq!(out[1].topic, "Others");
        assert_eq!(out[0], Annotation::default());
    }

    #[test]
    fn batch_lines_are_numbered_and_clipped() {
        let long = "x".repeat(MAX_TEXT_CHARS + 50);
        let text = numbered_batch(&["first".to_string(), long]);
        assert!(text.starts_with("[0] first\n\n[1] x"));
        assert_eq!(text.len(), "[0] first\n\n[1] ".len() + MAX_TEXT_CHARS);
    }

    #[test]
    fn prompt_lists_every_subtopic() {
        for s in SUBTOPICS {
            assert!(system_prompt().contains(s));
        }
    }
}
