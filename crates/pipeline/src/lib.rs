//! Ingredient image resolution pipeline.
//!
//! Two cached stages behind a batching scheduler and a progressive feed:
//! raw ingredient strings are normalized into short search terms with one
//! batched completion call, then resolved to catalog thumbnails in fixed-size
//! concurrent groups with inter-batch pacing. Every stage degrades rather
//! than fails — the worst outcome for a caller is an ingredient without an
//! image.

pub mod feed;
pub mod normalizer;
pub mod resolver;
pub mod scheduler;

#[cfg(test)]
mod testutil;

pub use feed::{FeedSnapshot, ImageFeed};
pub use normalizer::TermNormalizer;
pub use resolver::ImageResolver;
pub use scheduler::{BatchScheduler, ProgressUpdate};
