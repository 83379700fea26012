//! Bundle Module
//!
//! Durable persistence for complete analysis sessions. Unlike cache
//! entries, bundles carry no TTL and survive every sweep; only explicit
//! deletes remove them.

mod record;
mod store;

// Re-export public types
pub use record::AnalysisBundle;
pub use store::{BundleStats, BundleStore, BUNDLE_KEY_PREFIX};
