//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the engine's correctness properties against
//! an in-memory substrate.

use proptest::prelude::*;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::item::{current_timestamp_ms, CacheItem};
use crate::cache::{request_key, ApiCache};
use crate::config::CacheConfig;
use crate::storage::{MemoryStorage, Storage};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

fn cache_with(prefix: &str, max_entries: usize) -> ApiCache {
    let config = CacheConfig {
        default_ttl: Duration::from_secs(300),
        max_entries,
        key_prefix: prefix.to_string(),
    };
    ApiCache::new(config, Arc::new(MemoryStorage::new())).unwrap()
}

// == Strategies ==
/// Generates valid logical cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates cacheable string values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Generates instance prefixes
fn prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}_".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 1: Round-trip Consistency**
    // *For any* key and serializable value, putting the pair and getting it
    // back before expiration returns the exact value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let cache = cache_with("prop_", TEST_MAX_ENTRIES);

        prop_assert!(cache.put(&key, &value, None).is_stored());

        let retrieved: Option<String> = cache.get(&key);
        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // **Property 2: Delete Removes Entry**
    // *For any* key present in the cache, after delete a subsequent get
    // returns nothing.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let cache = cache_with("prop_", TEST_MAX_ENTRIES);

        cache.put(&key, &value, None);
        prop_assert!(cache.has(&key), "Key should exist before delete");

        cache.delete(&key);
        prop_assert!(!cache.has(&key), "Key should not exist after delete");
    }

    // **Property 3: Overwrite Semantics**
    // *For any* key, storing V1 and then V2 under the same key results in
    // get returning V2 and exactly one entry existing.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let cache = cache_with("prop_", TEST_MAX_ENTRIES);

        cache.put(&key, &value1, None);
        cache.put(&key, &value2, None);

        let retrieved: Option<String> = cache.get(&key);
        prop_assert_eq!(retrieved, Some(value2), "Overwrite should return new value");
        prop_assert_eq!(cache.stats().count, 1, "Should have exactly one entry after overwrite");
    }

    // **Property 4: Capacity Enforcement**
    // *For any* sequence of puts, the number of retained entries never
    // exceeds max_entries once the write-triggered sweep has run.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..40
        )
    ) {
        let max_entries = 5;
        let cache = cache_with("prop_", max_entries);

        for (key, value) in entries {
            cache.put(&key, &value, None);
            let count = cache.stats().count;
            prop_assert!(
                count <= max_entries,
                "Cache size {} exceeds max {}",
                count,
                max_entries
            );
        }
    }

    // **Property 5: Eviction Keeps the Newest Entries**
    // *For any* set of entries with distinct creation times, a sweep over a
    // full cache retains exactly the max_entries most recently created and
    // removes the rest.
    #[test]
    fn prop_eviction_keeps_newest(
        keys in prop::collection::hash_set("[a-z0-9]{1,16}", 1..30),
        max_entries in 1usize..8
    ) {
        let storage = Arc::new(MemoryStorage::new());
        let config = CacheConfig {
            default_ttl: Duration::from_secs(300),
            max_entries,
            key_prefix: "prop_".to_string(),
        };
        let cache = ApiCache::new(config, storage.clone()).unwrap();
        let expires_at = current_timestamp_ms() + 3_600_000;

        // Plant entries with controlled creation times, newest last.
        let keys: Vec<String> = keys.into_iter().collect();
        for (i, key) in keys.iter().enumerate() {
            let item = CacheItem {
                data: serde_json::json!(i),
                created_at: 1_000_000 + (i as u64) * 1_000,
                expires_at,
            };
            let raw = serde_json::to_string(&item).unwrap();
            storage.set_raw(&format!("prop_{}", key), &raw).unwrap();
        }

        let report = cache.cleanup();

        let expected_evicted = keys.len().saturating_sub(max_entries);
        prop_assert_eq!(report.evicted, expected_evicted, "Eviction count mismatch");

        // Survivors are precisely the newest-created suffix.
        let cutoff = keys.len().saturating_sub(max_entries);
        for (i, key) in keys.iter().enumerate() {
            if i < cutoff {
                prop_assert!(!cache.has(key), "Old entry '{}' should be evicted", key);
            } else {
                prop_assert!(cache.has(key), "New entry '{}' should survive", key);
            }
        }
    }

    // **Property 6: Namespace Isolation**
    // *For any* two instances with non-overlapping prefixes sharing one
    // substrate, operations on one are invisible to the other.
    #[test]
    fn prop_namespace_isolation(
        prefix_a in prefix_strategy(),
        prefix_b in prefix_strategy(),
        key in valid_key_strategy(),
        value_a in valid_value_strategy(),
        value_b in valid_value_strategy()
    ) {
        prop_assume!(!prefix_a.starts_with(&prefix_b) && !prefix_b.starts_with(&prefix_a));

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let cache_a = ApiCache::new(CacheConfig::new(prefix_a), storage.clone()).unwrap();
        let cache_b = ApiCache::new(CacheConfig::new(prefix_b), storage.clone()).unwrap();

        cache_a.put(&key, &value_a, None);
        cache_b.put(&key, &value_b, None);

        prop_assert_eq!(cache_a.get::<String>(&key), Some(value_a.clone()));
        prop_assert_eq!(cache_b.get::<String>(&key), Some(value_b.clone()));

        // Deleting on one side leaves the other untouched.
        cache_a.delete(&key);
        prop_assert_eq!(cache_b.get::<String>(&key), Some(value_b.clone()));

        // Clearing one namespace never crosses the prefix boundary.
        cache_a.put(&key, &value_a, None);
        cache_b.clear();
        prop_assert_eq!(cache_b.stats().count, 0);
        prop_assert_eq!(cache_a.get::<String>(&key), Some(value_a.clone()));
    }

    // **Property 7: Corruption Resilience**
    // *For any* unparseable payload planted under the prefix, reads treat
    // it as a miss, a sweep removes exactly it, and the instance stays
    // usable afterwards.
    #[test]
    fn prop_corruption_resilience(
        garbage in "[a-zA-Z0-9 ]{1,64}",
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        prop_assume!(key != "corrupted" && key != "after");

        let storage = Arc::new(MemoryStorage::new());
        let cache = ApiCache::new(CacheConfig::new("prop_"), storage.clone()).unwrap();

        cache.put(&key, &value, None);
        storage.set_raw("prop_corrupted", &garbage).unwrap();

        // A sweep removes exactly the unparseable entry.
        let report = cache.cleanup();
        prop_assert_eq!(report.corrupted, 1, "Sweep should reap the corrupted entry");
        prop_assert_eq!(report.expired, 0);

        // The healthy entry is unaffected and the instance stays usable.
        prop_assert_eq!(cache.get::<String>(&key), Some(value.clone()));
        cache.put("after", &value, None);
        prop_assert!(cache.has("after"));
    }

    // **Property 8: Derived Request Keys**
    // *For any* URL and parameters, the derived key is deterministic and
    // stays within the substrate-safe character set.
    #[test]
    fn prop_request_key_charset_and_determinism(
        url in ".{0,80}",
        param in "[a-zA-Z0-9 ]{0,40}"
    ) {
        let params = serde_json::json!({ "q": param });

        let first = request_key(&url, Some(&params));
        let second = request_key(&url, Some(&params));

        prop_assert_eq!(&first, &second, "Derived key must be deterministic");
        prop_assert!(
            first.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "Derived key '{}' contains unsafe characters",
            first
        );
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // **Property 9: TTL Expiration Behavior**
    // *For any* entry stored with a TTL, once the TTL has elapsed a get
    // returns nothing and the entry is reaped.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        let cache = cache_with("prop_", TEST_MAX_ENTRIES);

        cache.put(&key, &value, Some(Duration::from_millis(25)));

        let before: Option<String> = cache.get(&key);
        prop_assert_eq!(before, Some(value), "Entry should exist before TTL expires");

        sleep(Duration::from_millis(40));

        let after: Option<String> = cache.get(&key);
        prop_assert!(after.is_none(), "Entry should not be found after TTL expires");
        prop_assert_eq!(cache.stats().count, 0, "Expired entry should be reaped");
    }
}

// == Property Test for Read-Through Behavior ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // **Property 10: Read-Through Caching**
    // *For any* value, the first cached_call invokes the producer and every
    // subsequent call within the TTL returns the cached value without
    // invoking it again. Producer failures are never cached.
    #[test]
    fn prop_cached_call_read_through(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        error in "[a-z ]{1,32}"
    ) {
        use std::sync::atomic::{AtomicU32, Ordering};

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = cache_with("prop_", TEST_MAX_ENTRIES);
            let calls = AtomicU32::new(0);

            // A failure propagates and leaves nothing behind.
            let failed: Result<String, String> = cache
                .cached_call(&key, None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(error.clone())
                })
                .await;
            prop_assert_eq!(failed.unwrap_err(), error);
            prop_assert!(!cache.has(&key), "Failed producer result must not be cached");

            // The next call retries the producer and caches the success.
            let produced: Result<String, String> = cache
                .cached_call(&key, None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(value.clone())
                })
                .await;
            prop_assert_eq!(produced.unwrap(), value.clone());

            let repeated: Result<String, String> = cache
                .cached_call(&key, None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("never produced".to_string())
                })
                .await;
            prop_assert_eq!(repeated.unwrap(), value.clone());
            prop_assert_eq!(calls.load(Ordering::SeqCst), 2, "Hit must not invoke producer");

            Ok(())
        })?;
    }
}

// == Property Test for Concurrent Operation Correctness ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // **Property 11: Concurrent Operation Correctness**
    // *For any* set of keys written from several threads at once, every
    // read observes a complete value and the sweep still enforces the
    // capacity bound.
    #[test]
    fn prop_concurrent_operation_correctness(
        keys in prop::collection::hash_set("[a-z0-9]{1,12}", 4..16)
    ) {
        let cache = cache_with("prop_", TEST_MAX_ENTRIES);
        let keys: Vec<String> = keys.into_iter().collect();

        std::thread::scope(|scope| {
            for chunk in keys.chunks(4) {
                let cache = &cache;
                scope.spawn(move || {
                    for key in chunk {
                        cache.put(key, &format!("value_{}", key), None);
                        let _ = cache.get::<String>(key);
                    }
                });
            }
        });

        // Every write is visible and intact once the threads are done.
        for key in &keys {
            let value: Option<String> = cache.get(key);
            prop_assert_eq!(value, Some(format!("value_{}", key)), "Lost write for '{}'", key);
        }
        prop_assert!(cache.stats().count <= TEST_MAX_ENTRIES);
    }
}
