//! In-Memory Substrate
//!
//! A process-local implementation of the [`Storage`] contract backed by
//! an ordered map. Useful as the substrate for tests and for hosts that
//! want caching semantics without persistence.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{Storage, StorageError};

// == Memory Storage ==
/// Map-backed substrate with an optional total-byte quota.
///
/// The quota counts key bytes plus value bytes across the whole store,
/// mirroring the hard limit a browser-style persistent store imposes.
/// A write that would push the total past the quota fails with
/// [`StorageError::Full`] and leaves the store unchanged; overwrites
/// are charged only for their size delta.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    /// Total byte quota (keys + values), None = unbounded
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    // == Constructors ==
    /// Creates an unbounded in-memory substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory substrate that rejects writes once the
    /// total size of keys and values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Returns the total bytes currently held (keys + values).
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();

        if let Some(quota) = self.quota_bytes {
            let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            // Overwrites release the old value's bytes before charging the new.
            let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let projected = current - replaced + key.len() + value.len();
            if projected > quota {
                return Err(StorageError::Full(format!(
                    "quota of {} bytes exceeded (would use {})",
                    quota, projected
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn remove_raw(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
