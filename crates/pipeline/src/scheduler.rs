//! Batched orchestration of normalization and image lookups.

use std::collections::HashMap;
use std::time::Duration;

use common::{ingredient_key, Result};
use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::normalizer::TermNormalizer;
use crate::resolver::ImageResolver;

/// Progress reported after each group settles.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Accumulated raw ingredient → thumbnail URL map.
    pub images: HashMap<String, String>,
    /// Ingredients attempted so far (resolved or not).
    pub attempted: usize,
    /// Total ingredients in this run.
    pub total: usize,
}

/// Runs the full pipeline for one ingredient list.
pub struct BatchScheduler {
    normalizer: TermNormalizer,
    resolver: ImageResolver,
    batch_size: usize,
    batch_delay: Duration,
}

/// Exact-duplicate strings collapse to their first occurrence; blank lines
/// drop out. Order is otherwise preserved.
pub fn unique_ingredients(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .filter(|r| !ingredient_key(r).is_empty())
        .filter(|r| seen.insert(r.to_string()))
        .cloned()
        .collect()
}

impl BatchScheduler {
    pub fn new(
        normalizer: TermNormalizer,
        resolver: ImageResolver,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            normalizer,
            resolver,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// Resolve a whole ingredient list, reporting progress per group.
    ///
    /// One normalization pass covers the full list up front; image lookups
    /// then run in consecutive fixed-size groups. Members of a group resolve
    /// concurrently, groups are strictly sequential, and every group except
    /// the last is followed by the configured pacing delay. Within a group,
    /// duplicate canonical terms are looked up once and fanned back out to
    /// each raw ingredient that produced them.
    pub async fn run<F>(&self, raw: &[String], mut on_progress: F) -> Result<HashMap<String, String>>
    where
        F: FnMut(ProgressUpdate) + Send,
    {
        let unique = unique_ingredients(raw);
        let total = unique.len();
        if total == 0 {
            return Ok(HashMap::new());
        }

        info!(
            "Resolving {} ingredients in groups of {}",
            total, self.batch_size
        );

        let terms = self.normalizer.simplify(&unique).await;

        let mut images: HashMap<String, String> = HashMap::new();
        let mut attempted = 0usize;
        let group_count = total.div_ceil(self.batch_size);

        for (group_idx, group) in unique.chunks(self.batch_size).enumerate() {
            // One lookup per distinct term in the group.
            let mut group_terms: Vec<String> = Vec::new();
            for ingredient in group {
                if let Some(term) = terms.get(ingredient) {
                    if !group_terms.contains(term) {
                        group_terms.push(term.clone());
                    }
                }
            }

            let lookups = group_terms.iter().map(|term| async move {
                (term.clone(), self.resolver.resolve(term).await)
            });
            let resolved: HashMap<String, Option<String>> =
                join_all(lookups).await.into_iter().collect();

            for ingredient in group {
                let url = terms
                    .get(ingredient)
                    .and_then(|term| resolved.get(term))
                    .and_then(|url| url.clone());
                if let Some(url) = url {
                    images.insert(ingredient.clone(), url);
                }
            }

            attempted += group.len();
            debug!(
                "Group {}/{} settled: {}/{} ingredients have images",
                group_idx + 1,
                group_count,
                images.len(),
                attempted
            );
            on_progress(ProgressUpdate {
                images: images.clone(),
                attempted,
                total,
            });

            if group_idx + 1 < group_count {
                sleep(self.batch_delay).await;
            }
        }

        Ok(images)
    }
}
