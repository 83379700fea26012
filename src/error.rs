//! Error types for the caching substrate
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::storage::StorageError;

// == Cache Error Enum ==
/// Unified error type for the caching substrate.
///
/// Degraded-mode conditions inside the cache engine (a full store, a
/// corrupted entry) do not appear here: the engine recovers from them
/// locally and reports them through [`PutOutcome`] and logging. This
/// enum carries the failures that must reach the caller: substrate
/// failures on user data, serialization failures on user data, and
/// configuration mistakes.
///
/// [`PutOutcome`]: crate::cache::PutOutcome
#[derive(Error, Debug)]
pub enum CacheError {
    /// The durable substrate rejected an operation
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A record could not be serialized or deserialized
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A cache or store was constructed with an invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the caching substrate.
pub type Result<T> = std::result::Result<T, CacheError>;
