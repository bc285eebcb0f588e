//! Pipeline configuration types.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key for term normalization.
    #[serde(default)]
    pub anthropic_api_key: String,

    /// Ingredient catalog API key.
    #[serde(default)]
    pub catalog_api_key: String,

    /// Completion (normalization) parameters.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Catalog lookup parameters.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Batching and pacing parameters.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Persistent cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Completion service parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry attempts on 429 or timeout.
    #[serde(default = "default_llm_retries")]
    pub max_retries: u32,
}

/// Catalog service parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog API base URL.
    #[serde(default = "default_catalog_base")]
    pub base_url: String,

    /// Courtesy request rate toward the catalog (requests per second).
    #[serde(default = "default_catalog_rps")]
    pub requests_per_sec: u32,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_catalog_timeout_ms")]
    pub timeout_ms: u64,
}

/// Scheduler batching parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Ingredients resolved concurrently per group.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between groups in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

/// Persistent cache parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the cache store file.
    #[serde(default = "default_cache_dir")]
    pub dir: String,

    /// Persist the cache to disk (false = in-memory only).
    #[serde(default = "default_true")]
    pub persist: bool,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".into()
}
fn default_llm_timeout_ms() -> u64 {
    20_000
}
fn default_llm_retries() -> u32 {
    2
}

fn default_catalog_base() -> String {
    "https://api.spoonacular.com".into()
}
fn default_catalog_rps() -> u32 {
    5
}
fn default_catalog_timeout_ms() -> u64 {
    10_000
}

fn default_batch_size() -> usize {
    5
}
fn default_batch_delay_ms() -> u64 {
    500
}

fn default_cache_dir() -> String {
    ".ingredient-images".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_llm_retries(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base(),
            requests_per_sec: default_catalog_rps(),
            timeout_ms: default_catalog_timeout_ms(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            persist: default_true(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            catalog_api_key: String::new(),
            llm: LlmConfig::default(),
            catalog: CatalogConfig::default(),
            batch: BatchConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
