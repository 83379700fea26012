//! Txcache - A persistent caching substrate for transaction analysis
//!
//! Provides TTL-expiring API caches with capacity eviction over a shared
//! durable store, plus a bundle store for complete analysis sessions.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod named;
pub mod storage;

pub use bundle::{AnalysisBundle, BundleStats, BundleStore};
pub use cache::{ApiCache, CacheStats, CleanupReport, PutOutcome};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use maintenance::{Maintenance, MaintenanceReport};
pub use named::AnalysisCaches;
pub use storage::{MemoryStorage, SledStorage, Storage};
