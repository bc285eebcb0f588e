//! Ingredient image catalog client.
//!
//! Wraps the catalog's autocomplete-style search: one term in, at most one
//! candidate out, thumbnail URL built from a known base path. Quota (402)
//! and auth (401) rejections degrade to "no image" — they matter for logs,
//! not for control flow.

pub mod rate_limit;

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use common::{Error, IngredientCatalog, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::rate_limit::RateLimiter;

const AUTOCOMPLETE_PATH: &str = "/food/ingredients/autocomplete";
const IMAGE_BASE_URL: &str = "https://img.spoonacular.com/ingredients_100x100/";

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so network failures (DNS/TLS/socket) are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// One autocomplete candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Build the full thumbnail URL from a candidate's image reference.
pub fn thumbnail_url(image_ref: &str) -> String {
    format!("{}{}", IMAGE_BASE_URL, image_ref)
}

/// Async client for the ingredient catalog.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl CatalogClient {
    pub fn new(api_key: String, base_url: String, requests_per_sec: u32, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("failed to build catalog HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter: RateLimiter::per_second(requests_per_sec),
        }
    }

    /// Look up the single best-matching candidate for a term.
    pub async fn lookup(&self, term: &str) -> Result<Option<IngredientCandidate>> {
        self.limiter.wait().await;

        let url = format!("{}{}", self.base_url, AUTOCOMPLETE_PATH);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query", term),
                ("number", "1"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        match status {
            200 => {}
            402 => {
                warn!("Catalog quota exhausted looking up '{}'", term);
                return Ok(None);
            }
            401 | 403 => {
                warn!("Catalog rejected credentials looking up '{}'", term);
                return Ok(None);
            }
            429 => {
                warn!("Catalog rate limited looking up '{}'", term);
                return Ok(None);
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::CatalogApi {
                    status,
                    message: body,
                });
            }
        }

        let candidates: Vec<IngredientCandidate> = resp
            .json()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        debug!("Catalog returned {} candidates for '{}'", candidates.len(), term);
        Ok(candidates.into_iter().next())
    }
}

#[async_trait]
impl IngredientCatalog for CatalogClient {
    async fn search_image(&self, term: &str) -> Result<Option<String>> {
        let candidate = self.lookup(term).await?;
        Ok(candidate
            .and_then(|c| c.image)
            .filter(|image_ref| !image_ref.is_empty())
            .map(|image_ref| thumbnail_url(&image_ref)))
    }
}
