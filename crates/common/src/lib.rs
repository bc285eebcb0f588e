//! Shared types, config, error definitions, and service traits for the
//! ingredient image pipeline.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use traits::{IngredientCatalog, KeyValueStore, TermCompletion};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
