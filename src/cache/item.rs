//! Cache Item Module
//!
//! Defines the envelope persisted for every cached value. Each entry in
//! the substrate is one self-describing JSON document: it can be parsed
//! back (or rejected as corrupt) without consulting any other key.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Item ==
/// A cached value together with its lifetime metadata.
///
/// Invariant: `expires_at > created_at`. A degenerate TTL is clamped up
/// to one millisecond at construction so the invariant holds even for
/// `Duration::ZERO`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheItem<T> {
    /// The cached value
    pub data: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<T> CacheItem<T> {
    // == Constructor ==
    /// Wraps a value with a lifetime starting now.
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = (ttl.as_millis() as u64).max(1);

        Self {
            data,
            created_at: now,
            expires_at: now + ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks whether the item's TTL has elapsed.
    ///
    /// Boundary condition: an item is expired when the current time is
    /// greater than or equal to `expires_at`, so once the TTL duration
    /// has fully elapsed the item is immediately unavailable.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(current_timestamp_ms()))
    }
}

// == Cache Item Meta ==
/// Metadata-only view of a persisted item.
///
/// Sweeps and statistics need `created_at`/`expires_at` without knowing
/// the concrete `data` type; deserializing this view leaves the `data`
/// field untouched.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheItemMeta {
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheItemMeta {
    /// Parses the metadata out of a raw payload, `None` if the payload
    /// is not a well-formed item.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Checks whether the described item has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
