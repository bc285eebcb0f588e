//! Namespaced, time-expiring cache over a persistent key-value store.
//!
//! Two disjoint namespaces exist: `normalization:` (raw ingredient →
//! canonical term, 90-day TTL) and `image:` (canonical term → thumbnail URL,
//! 30-day TTL). The store underneath is a bare string map; all expiry policy
//! lives here. Storage failures are swallowed and logged — a broken cache
//! must never abort the pipeline.

pub mod cache;
pub mod clock;
pub mod store;

pub use cache::{CacheStats, Namespace, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{JsonFileStore, MemoryStore};
