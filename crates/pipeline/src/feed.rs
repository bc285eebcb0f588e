//! Progressive result feed — the caller-facing boundary of the pipeline.
//!
//! Each new ingredient list starts a run tagged with a generation number.
//! In-flight runs from older lists are never aborted; their progress and
//! final results are simply discarded when they arrive under a stale
//! generation, so the published state only ever reflects the newest input.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::scheduler::{unique_ingredients, BatchScheduler};

/// Published pipeline state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    /// Raw ingredient → thumbnail URL, for everything resolved so far.
    pub images: HashMap<String, String>,
    pub loading: bool,
    /// Ingredients attempted so far in the current run.
    pub loaded_count: usize,
    /// Ingredients in the current run.
    pub total_count: usize,
    /// Run-level failure, if any. Partial images stay visible alongside it.
    pub error: Option<String>,
}

/// Progressive image feed over a batch scheduler.
pub struct ImageFeed {
    scheduler: Arc<BatchScheduler>,
    enabled: AtomicBool,
    generation: AtomicU64,
    last_input: Mutex<Option<Vec<String>>>,
    tx: watch::Sender<FeedSnapshot>,
}

impl ImageFeed {
    pub fn new(scheduler: Arc<BatchScheduler>, enabled: bool) -> Arc<Self> {
        let (tx, _rx) = watch::channel(FeedSnapshot::default());
        Arc::new(Self {
            scheduler,
            enabled: AtomicBool::new(enabled),
            generation: AtomicU64::new(0),
            last_input: Mutex::new(None),
            tx,
        })
    }

    /// Watch the published state; the receiver sees every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.tx.subscribe()
    }

    /// Current published state.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.tx.borrow().clone()
    }

    /// Enable or disable the feed. Disabling resets to idle and orphans any
    /// in-flight run.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().expect("input lock poisoned") = None;
            self.tx.send_replace(FeedSnapshot::default());
        }
    }

    /// Supply a (possibly changed) ingredient list.
    ///
    /// A list equal by value to the previous input is a no-op — re-rendering
    /// callers can call this freely. A changed list supersedes any in-flight
    /// run and starts a fresh one; the returned handle settles when that run
    /// does. Returns `None` when no run was started.
    pub fn set_ingredients(self: &Arc<Self>, ingredients: Vec<String>) -> Option<JoinHandle<()>> {
        if !self.enabled.load(Ordering::SeqCst) {
            return None;
        }

        {
            let mut last = self.last_input.lock().expect("input lock poisoned");
            if last.as_ref() == Some(&ingredients) {
                debug!("Ingredient list unchanged, keeping current state");
                return None;
            }
            *last = Some(ingredients.clone());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let unique = unique_ingredients(&ingredients);
        let total = unique.len();

        if total == 0 {
            self.tx.send_replace(FeedSnapshot::default());
            return None;
        }

        self.tx.send_replace(FeedSnapshot {
            images: HashMap::new(),
            loading: true,
            loaded_count: 0,
            total_count: total,
            error: None,
        });
        debug!("Starting resolution run {} for {} ingredients", generation, total);

        let feed = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = feed
                .scheduler
                .run(&unique, |update| {
                    if feed.generation.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    feed.tx.send_modify(|snap| {
                        snap.images = update.images;
                        snap.loaded_count = update.attempted;
                    });
                })
                .await;

            if feed.generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding settled run {} (superseded)", generation);
                return;
            }

            match result {
                Ok(images) => {
                    feed.tx.send_modify(|snap| {
                        snap.images = images;
                        snap.loaded_count = snap.total_count;
                        snap.loading = false;
                    });
                }
                Err(e) => {
                    // Scheduler failures are degraded per-item by design, so
                    // this branch covers orchestration bugs only.
                    warn!("Resolution run {} failed: {}", generation, e);
                    feed.tx.send_modify(|snap| {
                        snap.error = Some(e.to_string());
                        snap.loading = false;
                    });
                }
            }
        }))
    }
}
