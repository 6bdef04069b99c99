use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// HarvestConfig: file-based config loader (forum-harvest.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "FORUM_HARVEST_CONFIG";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_nonempty(key).and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    let v = env_nonempty(key)?.to_ascii_lowercase();
    match v.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Scraper sub-config (mirrors the `scrape` key in forum-harvest.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScrapeConfig {
    /// Detail-fetch workers, each owning one browser. Default: 4.
    pub workers: Option<usize>,
    /// Run browsers without a window. Default: `true`.
    pub headless: Option<bool>,
    /// Upper bound for a single navigation. Default: 30 000 ms.
    pub page_load_timeout_ms: Option<u64>,
    /// Upper bound for waiting on tile / content selectors. Default: 12 000 ms.
    pub wait_timeout_ms: Option<u64>,
    /// Polite pause range between page loads. Default: 800–1600 ms.
    pub delay_min_ms: Option<u64>,
    pub delay_max_ms: Option<u64>,
    /// Directory for the CSV output. Default: the first existing desktop folder.
    pub output_dir: Option<PathBuf>,
}

impl ScrapeConfig {
    /// Workers: JSON field → `FORUM_HARVEST_WORKERS` → 4.
    pub fn resolve_workers(&self) -> usize {
        self.workers
            .or_else(|| env_parse("FORUM_HARVEST_WORKERS"))
            .unwrap_or(4)
    }

    /// Headless: JSON field → `FORUM_HARVEST_HEADLESS` → `true`.
    pub fn resolve_headless(&self) -> bool {
        self.headless
            .or_else(|| env_flag("FORUM_HARVEST_HEADLESS"))
            .unwrap_or(true)
    }

    /// Navigation timeout: JSON field → `FORUM_HARVEST_PAGE_TIMEOUT_MS` → 30 000.
    pub fn resolve_page_load_timeout_ms(&self) -> u64 {
        self.page_load_timeout_ms
            .or_else(|| env_parse("FORUM_HARVEST_PAGE_TIMEOUT_MS"))
            .unwrap_or(30_000)
    }

    /// Selector wait: JSON field → `FORUM_HARVEST_WAIT_TIMEOUT_MS` → 12 000.
    pub fn resolve_wait_timeout_ms(&self) -> u64 {
        self.wait_timeout_ms
            .or_else(|| env_parse("FORUM_HARVEST_WAIT_TIMEOUT_MS"))
            .unwrap_or(12_000)
    }

    /// Delay range: JSON fields → `FORUM_HARVEST_DELAY_MIN_MS` / `_MAX_MS` → 800..1600.
    /// A max below the min is raised to the min.
    pub fn resolve_delay_range_ms(&self) -> (u64, u64) {
        let min = self
            .delay_min_ms
            .or_else(|| env_parse("FORUM_HARVEST_DELAY_MIN_MS"))
            .unwrap_or(800);
        let max = self
            .delay_max_ms
            .or_else(|| env_parse("FORUM_HARVEST_DELAY_MAX_MS"))
            .unwrap_or(1600);
        (min, max.max(min))
    }

    /// Output dir: JSON field → `FORUM_HARVEST_OUTPUT_DIR` → `None` (desktop fallback).
    pub fn resolve_output_dir(&self) -> Option<PathBuf> {
        self.output_dir
            .clone()
            .or_else(|| env_nonempty("FORUM_HARVEST_OUTPUT_DIR").map(PathBuf::from))
    }
}

/// Classifier sub-config (mirrors the `classifier` key in forum-harvest.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ClassifierConfig {
    /// LLM endpoint, e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1` (Ollama).
    pub llm_base_url: Option<String>,
    /// API key. Never logged. Leave blank for key-less local endpoints.
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    /// Rows per chat completion request. Default: 25.
    pub batch_size: Option<usize>,
    /// Pause after each batch. Default: 300 ms.
    pub pause_ms: Option<u64>,
}

impl ClassifierConfig {
    /// API key: JSON field → `OPENAI_API_KEY` env var → `None`.
    ///
    /// An explicit `""` in the config file returns `Some("")`, meaning
    /// "no key required" (Ollama / LM Studio).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.llm_api_key {
            return Some(k.trim().to_string());
        }
        env_nonempty("OPENAI_API_KEY")
    }

    /// LLM base URL: JSON field → `OPENAI_BASE_URL` env var → `https://api.openai.com/v1`.
    pub fn resolve_base_url(&self) -> String {
        self.llm_base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| env_nonempty("OPENAI_BASE_URL"))
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
    }

    /// Model name: JSON field → `FORUM_CLASSIFY_MODEL` env var → `gpt-4.1-mini`.
    pub fn resolve_model(&self) -> String {
        self.llm_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| env_nonempty("FORUM_CLASSIFY_MODEL"))
            .unwrap_or_else(|| "gpt-4.1-mini".to_string())
    }

    /// Batch size: JSON field → `FORUM_CLASSIFY_BATCH_SIZE` → 25 (never below 1).
    pub fn resolve_batch_size(&self) -> usize {
        self.batch_size
            .or_else(|| env_parse("FORUM_CLASSIFY_BATCH_SIZE"))
            .unwrap_or(25)
            .max(1)
    }

    /// Pause: JSON field → `FORUM_CLASSIFY_PAUSE_MS` → 300.
    pub fn resolve_pause_ms(&self) -> u64 {
        self.pause_ms
            .or_else(|| env_parse("FORUM_CLASSIFY_PAUSE_MS"))
            .unwrap_or(300)
    }
}

/// Top-level config loaded from `forum-harvest.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct HarvestConfig {
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Load `forum-harvest.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `FORUM_HARVEST_CONFIG` env var path
/// 2. `./forum-harvest.json`
/// 3. `../forum-harvest.json`
///
/// Missing file → `HarvestConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `HarvestConfig::default()`.
pub fn load_harvest_config() -> HarvestConfig {
    let mut candidates = vec![
        PathBuf::from("forum-harvest.json"),
        PathBuf::from("../forum-harvest.json"),
    ];
    if let Some(env_path) = env_nonempty(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return parse_harvest_config(&contents, path);
    }

    HarvestConfig::default()
}

fn parse_harvest_config(contents: &str, path: &Path) -> HarvestConfig {
    match serde_json::from_str::<HarvestConfig>(contents) {
        Ok(cfg) => {
            tracing::info!("forum-harvest.json loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "forum-harvest.json parse error at {}: {}; using defaults",
                path.display(),
                e
            );
            HarvestConfig::default()
        }
    }
}

/// Optional override for the Chromium-family browser executable.
///
/// Only returns a value when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = env_nonempty(ENV_CHROME_EXECUTABLE)?;
    if Path::new(&p).exists() {
        Some(p)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fields_win_over_defaults() {
        let cfg = parse_harvest_config(
            r#"{"scrape":{"workers":7,"headless":false,"delay_min_ms":900,"delay_max_ms":100},
                "classifier":{"llm_model":"llama3","llm_api_key":"","batch_size":0}}"#,
            Path::new("inline.json"),
        );
        assert_eq!(cfg.scrape.resolve_workers(), 7);
        assert!(!cfg.scrape.resolve_headless());
        assert_eq!(cfg.scrape.resolve_delay_range_ms(), (900, 900));
        assert_eq!(cfg.classifier.resolve_model(), "llama3");
        assert_eq!(cfg.classifier.resolve_api_key().as_deref(), Some(""));
        assert_eq!(cfg.classifier.resolve_batch_size(), 1);
    }

    #[test]
    fn broken_json_falls_back_to_defaults() {
        let cfg = parse_harvest_config("{not json", Path::new("broken.json"));
        assert!(cfg.scrape.workers.is_none());
        assert!(cfg.classifier.llm_model.is_none());
    }

    #[test]
    fn missing_sections_default() {
        let cfg = parse_harvest_config(r#"{"scrape":{"wait_timeout_ms":500}}"#, Path::new("x"));
        assert_eq!(cfg.scrape.resolve_wait_timeout_ms(), 500);
        assert!(cfg.classifier.llm_base_url.is_none());
    }
}
