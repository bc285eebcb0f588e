//! Batch term normalization with cache consult and verbatim fallback.

use std::collections::HashMap;
use std::sync::Arc;

use common::{ingredient_key, TermCompletion};
use kv_cache::{Namespace, TtlCache};
use tracing::{debug, warn};

/// Turns raw ingredient strings into canonical 1–2 word search terms.
pub struct TermNormalizer {
    backend: Option<Arc<dyn TermCompletion>>,
    cache: TtlCache,
}

impl TermNormalizer {
    /// `backend` is `None` when no completion credential is configured; the
    /// normalizer then always falls back to verbatim terms.
    pub fn new(backend: Option<Arc<dyn TermCompletion>>, cache: TtlCache) -> Self {
        if backend.is_none() {
            warn!("No completion backend configured — canonical terms will be raw text");
        }
        Self { backend, cache }
    }

    /// Map every input raw string to a canonical term.
    ///
    /// Inputs are deduplicated by trimmed-lowercased key; cache hits skip the
    /// completion call entirely, and an unchanged ingredient list re-run is a
    /// pure cache pass with zero external calls. Blank inputs get no entry.
    pub async fn simplify(&self, raw: &[String]) -> HashMap<String, String> {
        // Dedup while keeping the mapping back to every original string.
        let mut order: Vec<String> = Vec::new();
        let mut originals: HashMap<String, Vec<String>> = HashMap::new();
        for ingredient in raw {
            let key = ingredient_key(ingredient);
            if key.is_empty() {
                continue;
            }
            originals
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key.clone());
                    Vec::new()
                })
                .push(ingredient.clone());
        }

        // Split into cache hits and misses, preserving miss order.
        let mut terms: HashMap<String, String> = HashMap::new();
        let mut misses: Vec<String> = Vec::new();
        for key in &order {
            match self.cache.get(Namespace::Normalization, key).await {
                Some(term) => {
                    terms.insert(key.clone(), term);
                }
                None => misses.push(key.clone()),
            }
        }

        if misses.is_empty() {
            debug!("Normalization fully cached ({} unique ingredients)", order.len());
        } else {
            debug!(
                "Normalizing {} of {} unique ingredients via completion",
                misses.len(),
                order.len()
            );
            self.resolve_misses(&misses, &mut terms).await;
        }

        // Expand unique keys back to every original raw string.
        let mut result = HashMap::new();
        for (key, raws) in &originals {
            if let Some(term) = terms.get(key) {
                for ingredient in raws {
                    result.insert(ingredient.clone(), term.clone());
                }
            }
        }
        result
    }

    /// Resolve the miss list with one completion call, or fall back to the
    /// verbatim (trimmed-lowercased) text for the whole batch.
    ///
    /// Only genuinely resolved terms are written to the cache — persisting a
    /// degraded verbatim term would pin the failure for the TTL window.
    async fn resolve_misses(&self, misses: &[String], terms: &mut HashMap<String, String>) {
        let resolved = match &self.backend {
            Some(backend) => match backend.simplify_terms(misses).await {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    warn!("Term simplification failed, using verbatim terms: {}", e);
                    None
                }
            },
            None => None,
        };

        match resolved {
            Some(resolved) => {
                for (key, term) in misses.iter().zip(resolved) {
                    self.cache.set(Namespace::Normalization, key, &term).await;
                    terms.insert(key.clone(), term);
                }
            }
            None => {
                for key in misses {
                    terms.insert(key.clone(), key.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{memory_cache, FakeCompletion};

    fn raws(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_simplify_maps_every_input() {
        let backend = Arc::new(FakeCompletion::with_terms(&[
            ("3 tablespoons olive oil", "olive oil"),
            ("2 cloves garlic, minced", "garlic"),
        ]));
        let normalizer = TermNormalizer::new(Some(backend.clone()), memory_cache());

        let input = raws(&["3 tablespoons olive oil", "2 cloves garlic, minced"]);
        let result = normalizer.simplify(&input).await;

        assert_eq!(result.get("3 tablespoons olive oil").unwrap(), "olive oil");
        assert_eq!(result.get("2 cloves garlic, minced").unwrap(), "garlic");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_pure_cache_pass() {
        let backend = Arc::new(FakeCompletion::with_terms(&[("2 cups flour", "flour")]));
        let normalizer = TermNormalizer::new(Some(backend.clone()), memory_cache());

        let input = raws(&["2 cups flour"]);
        normalizer.simplify(&input).await;
        let second = normalizer.simplify(&input).await;

        assert_eq!(second.get("2 cups flour").unwrap(), "flour");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_case_variants_share_one_cache_write() {
        let backend = Arc::new(FakeCompletion::with_terms(&[("1 cup flour", "flour")]));
        let cache = memory_cache();
        let normalizer = TermNormalizer::new(Some(backend.clone()), cache.clone());

        let input = raws(&["1 cup flour", "  1 cup Flour "]);
        let result = normalizer.simplify(&input).await;

        // Both originals get entries, through a single normalized key.
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("  1 cup Flour ").unwrap(), "flour");
        assert_eq!(backend.last_batch_len(), 1);

        let stats = cache.stats(Namespace::Normalization).await;
        assert_eq!(stats.count, 1);
        assert_eq!(stats.keys, vec!["1 cup flour"]);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_verbatim() {
        let backend = Arc::new(FakeCompletion::failing());
        let cache = memory_cache();
        let normalizer = TermNormalizer::new(Some(backend.clone()), cache.clone());

        let input = raws(&["3 Tablespoons Olive Oil "]);
        let result = normalizer.simplify(&input).await;

        assert_eq!(
            result.get("3 Tablespoons Olive Oil ").unwrap(),
            "3 tablespoons olive oil"
        );
        // Degraded terms are not persisted.
        assert_eq!(cache.stats(Namespace::Normalization).await.count, 0);
    }

    #[tokio::test]
    async fn test_missing_backend_never_calls_out() {
        let normalizer = TermNormalizer::new(None, memory_cache());

        let result = normalizer.simplify(&raws(&["1/2 cup chicken broth"])).await;
        assert_eq!(
            result.get("1/2 cup chicken broth").unwrap(),
            "1/2 cup chicken broth"
        );
    }

    #[tokio::test]
    async fn test_blank_inputs_are_skipped() {
        let backend = Arc::new(FakeCompletion::with_terms(&[("salt", "salt")]));
        let normalizer = TermNormalizer::new(Some(backend.clone()), memory_cache());

        let result = normalizer.simplify(&raws(&["salt", "   ", ""])).await;
        assert_eq!(result.len(), 1);
        assert_eq!(backend.last_batch_len(), 1);
    }
}
