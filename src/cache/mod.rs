//! Cache Module
//!
//! Provides persistent caching with TTL expiration and creation-time
//! capacity eviction over a shared durable substrate.

mod engine;
mod item;
mod key;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::{ApiCache, CleanupReport, PutOutcome};
pub use item::CacheItem;
pub use key::request_key;
pub use stats::CacheStats;

pub(crate) use item::current_timestamp_ms;
pub(crate) use key::storage_key;
