//! In-process fakes for the completion and catalog backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::{Error, IngredientCatalog, Result, TermCompletion};
use kv_cache::{MemoryStore, SystemClock, TtlCache};

/// Fresh in-memory TTL cache.
pub fn memory_cache() -> TtlCache {
    TtlCache::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock))
}

/// Scripted completion backend.
pub struct FakeCompletion {
    terms: HashMap<String, String>,
    fail: bool,
    calls: AtomicUsize,
    last_batch_len: AtomicUsize,
}

impl FakeCompletion {
    /// Answers each listed input with its term; unlisted inputs echo back.
    pub fn with_terms(pairs: &[(&str, &str)]) -> Self {
        Self {
            terms: pairs
                .iter()
                .map(|(raw, term)| (raw.to_string(), term.to_string()))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
            last_batch_len: AtomicUsize::new(0),
        }
    }

    /// Always errors, as if the service were down.
    pub fn failing() -> Self {
        Self {
            terms: HashMap::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            last_batch_len: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_batch_len(&self) -> usize {
        self.last_batch_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TermCompletion for FakeCompletion {
    async fn simplify_terms(&self, raw: &[String]) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_batch_len.store(raw.len(), Ordering::SeqCst);

        if self.fail {
            return Err(Error::Completion("service unavailable".into()));
        }

        Ok(raw
            .iter()
            .map(|r| self.terms.get(r).cloned().unwrap_or_else(|| r.clone()))
            .collect())
    }
}

/// Scripted catalog backend.
pub struct FakeCatalog {
    images: Mutex<HashMap<String, String>>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_images(pairs: &[(&str, &str)]) -> Self {
        Self {
            images: Mutex::new(
                pairs
                    .iter()
                    .map(|(term, url)| (term.to_string(), url.to_string()))
                    .collect(),
            ),
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always errors, as if every request hit a transport failure.
    pub fn failing() -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
            fail: true,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Add per-lookup latency, for racing runs against each other.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IngredientCatalog for FakeCatalog {
    async fn search_image(&self, term: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::Http("connection refused".into()));
        }

        Ok(self.images.lock().expect("images lock poisoned").get(term).cloned())
    }
}
