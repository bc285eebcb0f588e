//! Service trait seams.
//!
//! The pipeline only ever talks to its collaborators through these traits so
//! tests can inject in-process fakes (and a manual clock at the cache layer)
//! instead of live services or ambient storage.

use async_trait::async_trait;

use crate::Result;

/// Bare string key-value storage.
///
/// Namespacing and TTL semantics are layered on top by the cache crate; the
/// store itself knows nothing about either.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
    async fn all_keys(&self) -> Result<Vec<String>>;
}

/// Batched term simplification backend.
#[async_trait]
pub trait TermCompletion: Send + Sync {
    /// Simplify a batch of raw ingredient strings into canonical search
    /// terms, one per input item, in input order.
    ///
    /// Implementations must return exactly `raw.len()` terms or an error —
    /// a partially parseable response is treated as a total-batch failure.
    async fn simplify_terms(&self, raw: &[String]) -> Result<Vec<String>>;
}

/// Ingredient image catalog backend.
#[async_trait]
pub trait IngredientCatalog: Send + Sync {
    /// Best-match thumbnail URL for a search term.
    ///
    /// `Ok(None)` covers both "no such ingredient" and quota/auth rejections
    /// (those are distinguishable in logs only, not to callers). `Err` is
    /// reserved for transport-level failures.
    async fn search_image(&self, term: &str) -> Result<Option<String>>;
}
