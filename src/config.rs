//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    Ok(parse_positive_u64(raw, env_name)? as usize)
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.batch.batch_size == 0 {
        issues.push("batch.batch_size must be > 0".into());
    }
    if config.batch.batch_delay_ms > 60_000 {
        issues.push("batch.batch_delay_ms must be <= 60000".into());
    }
    if config.llm.timeout_ms == 0 {
        issues.push("llm.timeout_ms must be > 0".into());
    }
    if config.catalog.timeout_ms == 0 {
        issues.push("catalog.timeout_ms must be > 0".into());
    }
    if config.catalog.requests_per_sec == 0 {
        issues.push("catalog.requests_per_sec must be > 0".into());
    }
    if config.catalog.base_url.trim().is_empty() {
        issues.push("catalog.base_url must not be empty".into());
    }
    if config.cache.persist && config.cache.dir.trim().is_empty() {
        issues.push("cache.dir must not be empty when cache.persist is set".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load configuration from environment and optional config file.
///
/// Missing service credentials are not an error here — the pipeline degrades
/// to raw-text terms and imageless results rather than refusing to start.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        config.anthropic_api_key = key;
    }
    if let Ok(key) = std::env::var("CATALOG_API_KEY") {
        config.catalog_api_key = key;
    }
    if let Ok(model) = std::env::var("LLM_MODEL") {
        config.llm.model = model;
    }
    if let Ok(raw) = std::env::var("LLM_TIMEOUT_MS") {
        config.llm.timeout_ms = parse_positive_u64(&raw, "LLM_TIMEOUT_MS")?;
    }
    if let Ok(raw) = std::env::var("CATALOG_BASE_URL") {
        config.catalog.base_url = raw;
    }
    if let Ok(raw) = std::env::var("CATALOG_REQUESTS_PER_SEC") {
        config.catalog.requests_per_sec = parse_positive_u64(&raw, "CATALOG_REQUESTS_PER_SEC")? as u32;
    }
    if let Ok(raw) = std::env::var("BATCH_SIZE") {
        config.batch.batch_size = parse_positive_usize(&raw, "BATCH_SIZE")?;
    }
    if let Ok(raw) = std::env::var("BATCH_DELAY_MS") {
        config.batch.batch_delay_ms = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config("BATCH_DELAY_MS must be an integer >= 0".into()))?;
    }
    if let Ok(dir) = std::env::var("CACHE_DIR") {
        config.cache.dir = dir;
    }
    if let Ok(raw) = std::env::var("CACHE_PERSIST") {
        config.cache.persist = parse_bool(&raw);
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
