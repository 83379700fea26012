//! Configuration Module
//!
//! Per-instance cache configuration and the preset configurations for
//! the three analysis data classes. Configurations are plain values
//! handed to constructors; nothing here reads the environment, so a
//! host decides explicitly which caches exist and where they live.

use std::time::Duration;

use crate::error::{CacheError, Result};

// == Preset Parameters ==
/// TTL for verified contract metadata: source and ABI rarely change.
pub const CONTRACT_METADATA_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// TTL for transaction data: immutable once mined.
pub const TRANSACTION_DATA_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// TTL for simulation results: cheap to regenerate, volatile semantics.
pub const SIMULATION_RESULTS_TTL: Duration = Duration::from_secs(60 * 60);

// == Cache Config ==
/// Configuration of one named cache instance.
///
/// Immutable for the lifetime of the instance. The `key_prefix` defines
/// the isolation boundary: an instance may only ever touch keys under
/// its own prefix, so prefixes must not overlap between instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when a put does not specify one
    pub default_ttl: Duration,
    /// Maximum number of entries retained after a cleanup sweep
    pub max_entries: usize,
    /// Namespace prefix prepended to every logical key
    pub key_prefix: String,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration with an explicit namespace prefix and the
    /// general-purpose defaults (30 minute TTL, 100 entries).
    pub fn new(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            ..Self::default()
        }
    }

    // == Presets ==
    /// Contract metadata: 24 hour TTL, 200 entries.
    pub fn contract_metadata() -> Self {
        Self {
            default_ttl: CONTRACT_METADATA_TTL,
            max_entries: 200,
            key_prefix: "contract_cache_".to_string(),
        }
    }

    /// Transaction data: 7 day TTL, 50 entries.
    pub fn transaction_data() -> Self {
        Self {
            default_ttl: TRANSACTION_DATA_TTL,
            max_entries: 50,
            key_prefix: "tx_cache_".to_string(),
        }
    }

    /// Simulation results: 1 hour TTL, 20 entries.
    pub fn simulation_results() -> Self {
        Self {
            default_ttl: SIMULATION_RESULTS_TTL,
            max_entries: 20,
            key_prefix: "sim_cache_".to_string(),
        }
    }

    // == Validation ==
    /// Checks the configuration invariants.
    ///
    /// A misconfigured cache is a programming error, so constructors
    /// call this and fail before any key is ever touched:
    /// - `max_entries` must be positive (a zero-capacity cache would
    ///   evict every entry it stores),
    /// - `default_ttl` must be non-zero,
    /// - `key_prefix` must be non-empty (an empty prefix would claim
    ///   the entire substrate, including foreign namespaces).
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be non-zero".to_string(),
            ));
        }
        if self.key_prefix.is_empty() {
            return Err(CacheError::InvalidConfig(
                "key_prefix must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(30 * 60),
            max_entries: 100,
            key_prefix: "api_cache_".to_string(),
        }
    }
}
