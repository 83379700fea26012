//! Cache Engine Module
//!
//! Main cache engine over the durable substrate: typed JSON entries with
//! TTL expiration, write-triggered maintenance sweeps, and creation-time
//! capacity eviction.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::item::{CacheItem, CacheItemMeta};
use crate::cache::key::storage_key;
use crate::cache::stats::CacheStats;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::storage::{Storage, StorageError};

// == Put Outcome ==
/// Result of a cache write.
///
/// A write that cannot happen downgrades the call to a no-op instead of
/// failing the caller; the variant reports which no-op occurred so a
/// degraded store stays observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The entry was written
    Stored,
    /// The substrate is out of space, nothing was written
    SkippedFull,
    /// The substrate refused the write, nothing was written
    SkippedDenied,
    /// The value could not be serialized, nothing was written
    SkippedUnserializable,
}

impl PutOutcome {
    /// Returns true when the entry landed in the store.
    pub fn is_stored(&self) -> bool {
        matches!(self, PutOutcome::Stored)
    }
}

// == Cleanup Report ==
/// Counts of entries removed by one maintenance sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Entries removed because their TTL elapsed
    pub expired: usize,
    /// Entries removed to bring the instance back under capacity
    pub evicted: usize,
    /// Entries removed because their payload no longer parses
    pub corrupted: usize,
}

impl CleanupReport {
    /// Total number of entries removed by the sweep.
    pub fn total_removed(&self) -> usize {
        self.expired + self.evicted + self.corrupted
    }
}

// == Api Cache ==
/// One named cache instance over a shared durable substrate.
///
/// Every entry lives under the instance's key prefix, so several
/// instances with disjoint prefixes can share one substrate without
/// observing each other. All operations take `&self`; the substrate
/// handles concurrent access and a per-instance mutex serializes
/// maintenance sweeps.
pub struct ApiCache {
    /// Instance configuration (TTL, capacity, key prefix)
    config: CacheConfig,
    /// Shared durable substrate
    storage: Arc<dyn Storage>,
    /// Serializes cleanup/clear sweeps for this instance only
    sweep_lock: Mutex<()>,
}

impl ApiCache {
    // == Constructor ==
    /// Creates a cache instance over the given substrate.
    ///
    /// # Arguments
    /// * `config` - Instance configuration, validated before use
    /// * `storage` - The durable substrate shared with other instances
    ///
    /// # Returns
    /// * `Ok(ApiCache)` - Ready-to-use instance
    /// * `Err(CacheError::InvalidConfig)` - The configuration is unusable
    pub fn new(config: CacheConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            storage,
            sweep_lock: Mutex::new(()),
        })
    }

    /// Returns the instance configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the key prefix scoping this instance.
    pub fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    fn scoped_key(&self, key: &str) -> String {
        storage_key(&self.config.key_prefix, key)
    }

    // == Put ==
    /// Stores a value under the given key with optional TTL override.
    ///
    /// An existing entry under the same key is overwritten and its
    /// lifetime restarts. Every successful or skipped write triggers a
    /// maintenance sweep, so the instance converges back under capacity
    /// without an external scheduler.
    ///
    /// # Arguments
    /// * `key` - Logical key, scoped under the instance prefix
    /// * `value` - The value to cache
    /// * `ttl` - Lifetime for this entry (`None` uses the instance default)
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> PutOutcome {
        let item = CacheItem::new(value, ttl.unwrap_or(self.config.default_ttl));

        let payload = match serde_json::to_string(&item) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to serialize cache entry '{}': {}", key, err);
                return PutOutcome::SkippedUnserializable;
            }
        };

        let outcome = match self.storage.set_raw(&self.scoped_key(key), &payload) {
            Ok(()) => {
                debug!("Cached '{}' ({} bytes)", key, payload.len());
                PutOutcome::Stored
            }
            Err(StorageError::Full(msg)) => {
                warn!("Store full, skipping cache write for '{}': {}", key, msg);
                PutOutcome::SkippedFull
            }
            Err(StorageError::Denied(msg)) => {
                warn!("Store denied cache write for '{}': {}", key, msg);
                PutOutcome::SkippedDenied
            }
        };

        // Writes pay for maintenance; a full or denied store still gets
        // swept, which is often what frees the space again.
        self.cleanup();

        outcome
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on access and reported as a miss. An
    /// entry that no longer parses as a `CacheItem<T>` is treated as
    /// corrupted, removed, and reported as a miss as well, so callers
    /// must stay consistent about the type stored under each key.
    ///
    /// # Arguments
    /// * `key` - Logical key, scoped under the instance prefix
    ///
    /// # Returns
    /// * `Some(T)` - The cached value, fresh at the time of the call
    /// * `None` - Absent, expired, corrupted, or the substrate failed
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let scoped = self.scoped_key(key);

        let raw = match self.storage.get_raw(&scoped) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss for '{}'", key);
                return None;
            }
            Err(err) => {
                warn!("Store read failed for '{}', treating as miss: {}", key, err);
                return None;
            }
        };

        let item: CacheItem<T> = match serde_json::from_str(&raw) {
            Ok(item) => item,
            Err(err) => {
                warn!("Removing corrupted cache entry '{}': {}", key, err);
                self.remove_entry(&scoped);
                return None;
            }
        };

        if item.is_expired() {
            debug!("Cache entry '{}' expired, removing", key);
            self.remove_entry(&scoped);
            return None;
        }

        debug!("Cache hit for '{}'", key);
        Some(item.data)
    }

    // == Has ==
    /// Checks whether a fresh entry exists under the key.
    ///
    /// Goes through the same read path as `get`, so an expired or
    /// corrupted entry is reaped here too.
    pub fn has(&self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key. Removing an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.remove_entry(&self.scoped_key(key));
    }

    fn remove_entry(&self, scoped_key: &str) {
        if let Err(err) = self.storage.remove_raw(scoped_key) {
            warn!("Failed to remove cache entry '{}': {}", scoped_key, err);
        }
    }

    // == Clear ==
    /// Removes every entry under this instance's prefix.
    ///
    /// Keys outside the prefix are untouched, including other cache
    /// instances sharing the same substrate.
    pub fn clear(&self) {
        let _guard = self.sweep_lock.lock();

        let keys = match self.storage.list_keys(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(
                    "Failed to list keys for clear of '{}': {}",
                    self.config.key_prefix, err
                );
                return;
            }
        };

        let count = keys.len();
        for scoped in &keys {
            self.remove_entry(scoped);
        }

        info!("Cleared {} entries under '{}'", count, self.config.key_prefix);
    }

    // == Cleanup ==
    /// Runs one maintenance sweep over this instance's prefix.
    ///
    /// Phase one removes entries whose TTL elapsed and entries whose
    /// payload no longer parses. Phase two, when the survivors still
    /// exceed `max_entries`, evicts the oldest-created entries until the
    /// instance is back at capacity. Access recency never factors in.
    ///
    /// # Returns
    /// * `CleanupReport` - How many entries each phase removed
    pub fn cleanup(&self) -> CleanupReport {
        let _guard = self.sweep_lock.lock();

        let mut report = CleanupReport::default();

        let keys = match self.storage.list_keys(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(
                    "Failed to list keys for cleanup of '{}': {}",
                    self.config.key_prefix, err
                );
                return report;
            }
        };

        // Phase 1: drop expired and unparseable entries.
        let mut live: Vec<(String, u64)> = Vec::with_capacity(keys.len());
        for scoped in keys {
            match self.storage.get_raw(&scoped) {
                Ok(Some(raw)) => match CacheItemMeta::parse(&raw) {
                    Some(meta) if meta.is_expired() => {
                        self.remove_entry(&scoped);
                        report.expired += 1;
                    }
                    Some(meta) => live.push((scoped, meta.created_at)),
                    None => {
                        warn!("Removing corrupted cache entry '{}' during sweep", scoped);
                        self.remove_entry(&scoped);
                        report.corrupted += 1;
                    }
                },
                // Raced with a concurrent delete, nothing left to do.
                Ok(None) => {}
                Err(err) => {
                    warn!("Read failed during sweep for '{}': {}", scoped, err);
                }
            }
        }

        // Phase 2: evict oldest-created entries down to capacity.
        if live.len() > self.config.max_entries {
            live.sort_by(|a, b| a.1.cmp(&b.1));
            let excess = live.len() - self.config.max_entries;

            for (scoped, _) in live.drain(..excess) {
                self.remove_entry(&scoped);
                report.evicted += 1;
            }
        }

        if report.total_removed() > 0 {
            info!(
                "Cleanup of '{}': {} expired, {} evicted, {} corrupted",
                self.config.key_prefix, report.expired, report.evicted, report.corrupted
            );
        } else {
            debug!("Cleanup of '{}': nothing to remove", self.config.key_prefix);
        }

        report
    }

    // == Stats ==
    /// Computes a point-in-time snapshot of this instance's footprint.
    ///
    /// Unparseable entries count toward `count` and `approx_bytes` but
    /// are excluded from the oldest-entry computation.
    pub fn stats(&self) -> CacheStats {
        let keys = match self.storage.list_keys(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(
                    "Failed to list keys for stats of '{}': {}",
                    self.config.key_prefix, err
                );
                return CacheStats::default();
            }
        };

        let mut stats = CacheStats {
            count: keys.len(),
            ..Default::default()
        };

        let mut oldest: Option<u64> = None;
        for scoped in &keys {
            if let Ok(Some(raw)) = self.storage.get_raw(scoped) {
                stats.approx_bytes += raw.len();
                if let Some(meta) = CacheItemMeta::parse(&raw) {
                    oldest = Some(oldest.map_or(meta.created_at, |o| o.min(meta.created_at)));
                }
            }
        }

        stats.oldest_created_at = oldest.and_then(|ms| DateTime::from_timestamp_millis(ms as i64));
        stats
    }

    // == Cached Call ==
    /// Read-through wrapper around an async producer.
    ///
    /// Returns the cached value when a fresh entry exists; otherwise
    /// awaits the producer, caches its success, and returns it. The only
    /// suspension point is the producer call itself.
    ///
    /// A producer error propagates to the caller unmodified and nothing
    /// is cached, so the next call retries. A failed cache write is
    /// logged by `put` and does not affect the returned value.
    ///
    /// # Arguments
    /// * `key` - Logical key, scoped under the instance prefix
    /// * `ttl` - Lifetime for a newly produced entry (`None` uses the default)
    /// * `producer` - Invoked only on a cache miss
    ///
    /// # Example
    /// ```ignore
    /// let name = cache
    ///     .cached_call("contract_name_0xabc", None, || async {
    ///         fetch_contract_name("0xabc").await
    ///     })
    ///     .await?;
    /// ```
    pub async fn cached_call<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key) {
            return Ok(cached);
        }

        let value = producer().await?;
        self.put(key, &value, ttl);

        Ok(value)
    }
}
