//! Namespaced TTL cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;

/// Cache namespace. TTL is a property of the namespace, never a per-call
/// argument, so one namespace can't end up with mixed expiry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Raw ingredient string → canonical search term.
    Normalization,
    /// Canonical search term → thumbnail URL.
    Image,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Normalization => "normalization:",
            Namespace::Image => "image:",
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            Namespace::Normalization => Duration::days(90),
            Namespace::Image => Duration::days(30),
        }
    }
}

/// One stored value with its write timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    stored_at: DateTime<Utc>,
}

/// Per-namespace occupancy snapshot.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub count: usize,
    /// Keys without the namespace prefix.
    pub keys: Vec<String>,
}

/// TTL cache over an injected store and clock.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Read a value, evicting it first if expired or malformed.
    ///
    /// Fails soft: store errors and undecodable entries read as absent.
    pub async fn get(&self, ns: Namespace, key: &str) -> Option<String> {
        let full_key = format!("{}{}", ns.prefix(), key);

        let raw = match self.store.get_item(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", full_key, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Evicting malformed cache entry {}: {}", full_key, e);
                self.evict(&full_key).await;
                return None;
            }
        };

        if self.clock.now() - entry.stored_at >= ns.ttl() {
            debug!("Evicting expired cache entry {}", full_key);
            self.evict(&full_key).await;
            return None;
        }

        Some(entry.value)
    }

    /// Write (or overwrite) a value, resetting its timestamp to now.
    ///
    /// Write failures are logged and swallowed — the pipeline keeps going.
    pub async fn set(&self, ns: Namespace, key: &str, value: &str) {
        let full_key = format!("{}{}", ns.prefix(), key);
        let entry = CacheEntry {
            value: value.to_string(),
            stored_at: self.clock.now(),
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache entry encode failed for {}: {}", full_key, e);
                return;
            }
        };

        if let Err(e) = self.store.set_item(&full_key, &raw).await {
            warn!("Cache write failed for {}: {}", full_key, e);
        }
    }

    /// Remove every entry in a namespace.
    pub async fn clear(&self, ns: Namespace) {
        for key in self.namespace_keys(ns).await {
            self.evict(&key).await;
        }
    }

    /// Entry count and (unprefixed) keys for a namespace.
    pub async fn stats(&self, ns: Namespace) -> CacheStats {
        let prefix = ns.prefix();
        let keys: Vec<String> = self
            .namespace_keys(ns)
            .await
            .into_iter()
            .map(|k| k[prefix.len()..].to_string())
            .collect();

        CacheStats {
            count: keys.len(),
            keys,
        }
    }

    async fn namespace_keys(&self, ns: Namespace) -> Vec<String> {
        match self.store.all_keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(ns.prefix()))
                .collect(),
            Err(e) => {
                warn!("Cache key listing failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn evict(&self, full_key: &str) {
        if let Err(e) = self.store.remove_item(full_key).await {
            warn!("Cache eviction failed for {}: {}", full_key, e);
        }
    }
}
