//! Unified error type for the ingredient image pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Completion response malformed: {0}")]
    MalformedCompletion(String),

    #[error("Catalog API error (status={status}): {message}")]
    CatalogApi { status: u16, message: String },

    #[error("Rate limited — retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
