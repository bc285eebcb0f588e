//! Per-term image resolution with cache consult and last-word fallback.

use std::sync::Arc;

use common::{last_word, IngredientCatalog};
use kv_cache::{Namespace, TtlCache};
use tracing::{debug, warn};

/// Resolves a canonical term to a thumbnail URL, if the catalog has one.
pub struct ImageResolver {
    catalog: Option<Arc<dyn IngredientCatalog>>,
    cache: TtlCache,
}

impl ImageResolver {
    /// `catalog` is `None` when no catalog credential is configured; every
    /// resolution then reports "no image".
    pub fn new(catalog: Option<Arc<dyn IngredientCatalog>>, cache: TtlCache) -> Self {
        if catalog.is_none() {
            warn!("No catalog backend configured — image resolution disabled");
        }
        Self { catalog, cache }
    }

    /// Resolve one canonical term.
    ///
    /// Misses on a multi-word term are retried once with the last word only
    /// (the usual head noun). Negative results are never cached: a later
    /// catalog update or rephrased term may succeed, and re-checking is cheap
    /// because normalization is already cached.
    pub async fn resolve(&self, term: &str) -> Option<String> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }

        if let Some(url) = self.lookup_cached(term).await {
            return Some(url);
        }

        if let Some(broader) = last_word(term) {
            debug!("No catalog match for '{}', retrying as '{}'", term, broader);
            if let Some(url) = self.lookup_cached(broader).await {
                return Some(url);
            }
        }

        None
    }

    /// Cache-then-catalog lookup for a single term, caching only hits.
    async fn lookup_cached(&self, term: &str) -> Option<String> {
        if let Some(url) = self.cache.get(Namespace::Image, term).await {
            return Some(url);
        }

        let catalog = self.catalog.as_ref()?;
        match catalog.search_image(term).await {
            Ok(Some(url)) => {
                self.cache.set(Namespace::Image, term, &url).await;
                Some(url)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Catalog lookup failed for '{}': {}", term, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{memory_cache, FakeCatalog};

    #[tokio::test]
    async fn test_resolve_hit_is_cached() {
        let catalog = Arc::new(FakeCatalog::with_images(&[("garlic", "http://x/garlic.png")]));
        let cache = memory_cache();
        let resolver = ImageResolver::new(Some(catalog.clone()), cache.clone());

        assert_eq!(
            resolver.resolve("garlic").await,
            Some("http://x/garlic.png".into())
        );
        assert_eq!(catalog.calls(), 1);

        // Second resolution is served from cache.
        assert_eq!(
            resolver.resolve("garlic").await,
            Some("http://x/garlic.png".into())
        );
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_multiword_miss_retries_last_word() {
        let catalog = Arc::new(FakeCatalog::with_images(&[("basil", "http://x/basil.jpg")]));
        let cache = memory_cache();
        let resolver = ImageResolver::new(Some(catalog.clone()), cache.clone());

        assert_eq!(
            resolver.resolve("fresh basil").await,
            Some("http://x/basil.jpg".into())
        );
        assert_eq!(catalog.calls(), 2);

        // Cached under the narrower term that actually matched.
        assert_eq!(cache.get(Namespace::Image, "basil").await.as_deref(), Some("http://x/basil.jpg"));
        assert_eq!(cache.get(Namespace::Image, "fresh basil").await, None);
    }

    #[tokio::test]
    async fn test_single_word_miss_does_not_retry() {
        let catalog = Arc::new(FakeCatalog::with_images(&[]));
        let resolver = ImageResolver::new(Some(catalog.clone()), memory_cache());

        assert_eq!(resolver.resolve("broth").await, None);
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_negative_results_are_not_cached() {
        let catalog = Arc::new(FakeCatalog::with_images(&[]));
        let resolver = ImageResolver::new(Some(catalog.clone()), memory_cache());

        assert_eq!(resolver.resolve("broth").await, None);
        assert_eq!(resolver.resolve("broth").await, None);
        // Re-checked each time, not remembered as absent.
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn test_catalog_error_degrades_to_none() {
        let catalog = Arc::new(FakeCatalog::failing());
        let resolver = ImageResolver::new(Some(catalog), memory_cache());

        assert_eq!(resolver.resolve("olive oil").await, None);
    }

    #[tokio::test]
    async fn test_missing_catalog_resolves_nothing() {
        let resolver = ImageResolver::new(None, memory_cache());
        assert_eq!(resolver.resolve("garlic").await, None);
    }

    #[tokio::test]
    async fn test_blank_term_short_circuits() {
        let catalog = Arc::new(FakeCatalog::with_images(&[]));
        let resolver = ImageResolver::new(Some(catalog.clone()), memory_cache());

        assert_eq!(resolver.resolve("   ").await, None);
        assert_eq!(catalog.calls(), 0);
    }
}
