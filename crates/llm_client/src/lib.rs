//! Anthropic messages API client for batched ingredient term simplification.
//!
//! One request simplifies a whole batch: the prompt enumerates every raw
//! ingredient string and the model answers with one canonical term per line,
//! in order. Anything that doesn't parse back into exactly one term per input
//! is treated as a total-batch failure — the normalizer upstream falls back
//! to verbatim terms rather than risking misaligned answers.

pub mod prompt;

use std::time::Duration;

use async_trait::async_trait;
use common::{Error, Result, TermCompletion};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::prompt::{build_prompt, parse_terms, SYSTEM_PROMPT};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Completion client for term simplification.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl CompletionClient {
    pub fn new(api_key: String, model: String, timeout_ms: u64, max_retries: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("failed to build completion HTTP client");

        Self {
            client,
            api_key,
            model,
            max_retries,
        }
    }

    fn extract_text_content(response_body: &serde_json::Value) -> Result<&str> {
        let content_arr = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                Error::MalformedCompletion("missing or invalid 'content' field".into())
            })?;

        content_arr
            .iter()
            .find(|item| item["type"] == "text")
            .and_then(|item| item["text"].as_str())
            .ok_or_else(|| Error::MalformedCompletion("missing 'text' content".into()))
    }

    /// Send one completion request, retrying on 429 and timeouts.
    async fn complete(&self, user_prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            warn!("Completion rate limited, retry {}", attempt);
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(Error::Completion(format!(
                            "status {}: {}",
                            status.as_u16(),
                            body
                        )));
                    }

                    let response_body: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| Error::Completion(e.to_string()))?;
                    return Ok(Self::extract_text_content(&response_body)?.to_string());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        attempt += 1;
                        debug!("Completion request failed ({}), retry {}", e, attempt);
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    return Err(Error::Completion(e.to_string()));
                }
            }
        }
    }
}

#[async_trait]
impl TermCompletion for CompletionClient {
    async fn simplify_terms(&self, raw: &[String]) -> Result<Vec<String>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let user_prompt = build_prompt(raw);
        debug!("Simplifying {} ingredient strings in one call", raw.len());
        let text = self.complete(&user_prompt).await?;
        parse_terms(&text, raw.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_content() {
        let body = serde_json::json!({
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "olive oil\ngarlic"}
            ]
        });
        assert_eq!(
            CompletionClient::extract_text_content(&body).unwrap(),
            "olive oil\ngarlic"
        );
    }

    #[test]
    fn test_extract_text_content_missing() {
        let body = serde_json::json!({"content": [{"type": "image"}]});
        assert!(CompletionClient::extract_text_content(&body).is_err());

        let body = serde_json::json!({"error": "overloaded"});
        assert!(CompletionClient::extract_text_content(&body).is_err());
    }
}
