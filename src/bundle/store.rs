//! Bundle Store Module
//!
//! Persists analysis bundles under a reserved prefix of the shared
//! substrate. Bundles are user data, so unlike the cache engine every
//! write or delete failure here is a real error, and a record that no
//! longer parses is reported absent but left in place for inspection.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::bundle::record::{generate_bundle_id, AnalysisBundle};
use crate::cache::storage_key;
use crate::error::Result;
use crate::storage::Storage;

/// Reserved key prefix for persisted bundles.
pub const BUNDLE_KEY_PREFIX: &str = "analysis_bundle_";

// == Bundle Stats ==
/// Snapshot of the bundle store's footprint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BundleStats {
    /// Number of persisted bundle records, parseable or not
    pub count: usize,
    /// Total bytes of raw stored records
    pub approx_bytes: usize,
}

// == Bundle Store ==
/// Durable store for complete analysis sessions.
pub struct BundleStore {
    storage: Arc<dyn Storage>,
}

impl BundleStore {
    // == Constructor ==
    /// Creates a bundle store over the given substrate.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Returns the reserved prefix bundles live under.
    pub fn key_prefix(&self) -> &'static str {
        BUNDLE_KEY_PREFIX
    }

    fn bundle_key(&self, id: &str) -> String {
        storage_key(BUNDLE_KEY_PREFIX, id)
    }

    // == Save ==
    /// Persists a bundle and returns its id.
    ///
    /// An existing bundle is never overwritten: ids embed a millisecond
    /// timestamp, and on the rare collision the bundle gets a fresh id
    /// before the write.
    ///
    /// # Arguments
    /// * `bundle` - The session to persist
    ///
    /// # Returns
    /// * `Ok(String)` - The id the bundle was stored under
    /// * `Err(CacheError)` - Serialization or substrate failure
    pub fn save(&self, mut bundle: AnalysisBundle) -> Result<String> {
        while self.storage.get_raw(&self.bundle_key(&bundle.id))?.is_some() {
            bundle.id = generate_bundle_id();
        }

        let payload = serde_json::to_string(&bundle)?;
        self.storage.set_raw(&self.bundle_key(&bundle.id), &payload)?;

        info!(
            "Saved analysis bundle '{}' for tx {} ({} bytes)",
            bundle.id,
            bundle.tx_hash,
            payload.len()
        );
        Ok(bundle.id)
    }

    // == Load ==
    /// Loads a bundle by id.
    ///
    /// A record that no longer parses is reported as absent and logged,
    /// but kept on disk; removing user data is always an explicit call.
    ///
    /// # Arguments
    /// * `id` - The id returned by `save`
    ///
    /// # Returns
    /// * `Ok(Some(AnalysisBundle))` - The stored session
    /// * `Ok(None)` - No record under the id, or the record is unreadable
    /// * `Err(CacheError)` - Substrate failure
    pub fn load(&self, id: &str) -> Result<Option<AnalysisBundle>> {
        let raw = match self.storage.get_raw(&self.bundle_key(id))? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str(&raw) {
            Ok(bundle) => Ok(Some(bundle)),
            Err(err) => {
                warn!("Bundle '{}' is unreadable, leaving it in place: {}", id, err);
                Ok(None)
            }
        }
    }

    // == List All ==
    /// Returns every readable bundle, newest first.
    ///
    /// Unreadable records are logged and skipped; one corrupted bundle
    /// never hides the others.
    pub fn list_all(&self) -> Result<Vec<AnalysisBundle>> {
        let keys = self.storage.list_keys(BUNDLE_KEY_PREFIX)?;

        let mut bundles = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = match self.storage.get_raw(&key)? {
                Some(raw) => raw,
                None => continue,
            };
            match serde_json::from_str::<AnalysisBundle>(&raw) {
                Ok(bundle) => bundles.push(bundle),
                Err(err) => warn!("Skipping unreadable bundle under '{}': {}", key, err),
            }
        }

        bundles.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(bundles)
    }

    // == Delete ==
    /// Removes one bundle by id. Removing an absent id is a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.storage.remove_raw(&self.bundle_key(id))?;
        info!("Deleted analysis bundle '{}'", id);
        Ok(())
    }

    // == Delete All ==
    /// Removes every bundle record, readable or not.
    ///
    /// # Returns
    /// * `Ok(usize)` - How many records were removed
    pub fn delete_all(&self) -> Result<usize> {
        let keys = self.storage.list_keys(BUNDLE_KEY_PREFIX)?;

        for key in &keys {
            self.storage.remove_raw(key)?;
        }

        info!("Deleted all {} analysis bundles", keys.len());
        Ok(keys.len())
    }

    // == Stats ==
    /// Computes a point-in-time snapshot of the store's footprint.
    pub fn stats(&self) -> Result<BundleStats> {
        let keys = self.storage.list_keys(BUNDLE_KEY_PREFIX)?;

        let mut stats = BundleStats {
            count: keys.len(),
            ..Default::default()
        };
        for key in &keys {
            if let Some(raw) = self.storage.get_raw(key)? {
                stats.approx_bytes += raw.len();
            }
        }

        Ok(stats)
    }
}
