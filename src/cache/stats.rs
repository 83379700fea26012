//! Cache Statistics Module
//!
//! Point-in-time aggregates over one cache instance's key set, computed
//! by scanning the substrate rather than by keeping counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

// == Cache Stats ==
/// Snapshot of a cache instance's current footprint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of keys under the instance prefix, parseable or not
    pub count: usize,
    /// Total bytes of raw stored payloads
    pub approx_bytes: usize,
    /// Creation time of the oldest parseable entry
    pub oldest_created_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Oldest Entry Age ==
    /// Returns how long ago the oldest parseable entry was created.
    pub fn oldest_age(&self) -> Option<Duration> {
        let oldest = self.oldest_created_at?;
        (Utc::now() - oldest).to_std().ok()
    }

    // == Size Display ==
    /// Formats the approximate payload size in kilobytes.
    pub fn approx_size_display(&self) -> String {
        format!("{:.2} KB", self.approx_bytes as f64 / 1024.0)
    }
}
