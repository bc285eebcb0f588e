//! Request pacing toward the ingredient catalog.
//!
//! The catalog enforces an informal courtesy rate; this limiter is the
//! per-request guard, distinct from the scheduler's inter-batch delay.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter =
    GovLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Single-bucket rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create with a per-second request limit.
    pub fn per_second(requests_per_sec: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_sec.max(1)).expect("nonzero after max(1)"),
        );
        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a request slot is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}
