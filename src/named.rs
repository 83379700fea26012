//! Named Cache Instances Module
//!
//! Wires the dashboard's three cache classes (contract metadata,
//! transaction data, simulation results) and the bundle store over one
//! shared substrate, and exposes typed helpers for the hot lookups.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::bundle::{BundleStore, BUNDLE_KEY_PREFIX};
use crate::cache::{ApiCache, PutOutcome};
use crate::config::{
    CacheConfig, CONTRACT_METADATA_TTL, SIMULATION_RESULTS_TTL, TRANSACTION_DATA_TTL,
};
use crate::error::{CacheError, Result};
use crate::storage::Storage;

// == Analysis Caches ==
/// The full caching surface of an analysis session.
///
/// All members share one substrate; each owns a reserved key prefix, so
/// clearing or sweeping one class never touches another.
pub struct AnalysisCaches {
    contracts: ApiCache,
    transactions: ApiCache,
    simulations: ApiCache,
    bundles: BundleStore,
}

impl AnalysisCaches {
    // == Constructor ==
    /// Builds the three preset cache classes and the bundle store.
    pub fn new(storage: Arc<dyn Storage>) -> Result<Self> {
        Self::with_configs(
            storage,
            CacheConfig::contract_metadata(),
            CacheConfig::transaction_data(),
            CacheConfig::simulation_results(),
        )
    }

    // == Custom Constructor ==
    /// Builds the cache classes from caller-supplied configurations.
    ///
    /// Fails fast when any two prefixes overlap (equal, or one a prefix
    /// of the other), including the reserved bundle prefix; overlapping
    /// namespaces would let one instance sweep another's entries.
    pub fn with_configs(
        storage: Arc<dyn Storage>,
        contracts: CacheConfig,
        transactions: CacheConfig,
        simulations: CacheConfig,
    ) -> Result<Self> {
        validate_disjoint_prefixes(&[
            &contracts.key_prefix,
            &transactions.key_prefix,
            &simulations.key_prefix,
            BUNDLE_KEY_PREFIX,
        ])?;

        Ok(Self {
            contracts: ApiCache::new(contracts, storage.clone())?,
            transactions: ApiCache::new(transactions, storage.clone())?,
            simulations: ApiCache::new(simulations, storage.clone())?,
            bundles: BundleStore::new(storage),
        })
    }

    /// Cache for verified contract metadata (24h TTL, 200 entries).
    pub fn contracts(&self) -> &ApiCache {
        &self.contracts
    }

    /// Cache for mined transaction data (7d TTL, 50 entries).
    pub fn transactions(&self) -> &ApiCache {
        &self.transactions
    }

    /// Cache for simulation results (1h TTL, 20 entries).
    pub fn simulations(&self) -> &ApiCache {
        &self.simulations
    }

    /// Durable store for saved analysis sessions.
    pub fn bundles(&self) -> &BundleStore {
        &self.bundles
    }

    // == Contract Names ==
    /// Caches a resolved contract name for 24 hours.
    ///
    /// Addresses are lowercased, so lookups are case-insensitive across
    /// checksummed and plain hex forms.
    pub fn cache_contract_name(&self, address: &str, name: &str) -> PutOutcome {
        self.contracts
            .put(&contract_name_key(address), &name, Some(CONTRACT_METADATA_TTL))
    }

    /// Looks up a previously resolved contract name.
    pub fn contract_name(&self, address: &str) -> Option<String> {
        self.contracts.get(&contract_name_key(address))
    }

    // == Transaction Traces ==
    /// Caches a full execution trace for 7 days; mined traces never change.
    pub fn cache_transaction_trace<T: Serialize>(&self, tx_hash: &str, trace: &T) -> PutOutcome {
        self.transactions
            .put(&tx_trace_key(tx_hash), trace, Some(TRANSACTION_DATA_TTL))
    }

    /// Looks up a previously cached execution trace.
    pub fn transaction_trace<T: DeserializeOwned>(&self, tx_hash: &str) -> Option<T> {
        self.transactions.get(&tx_trace_key(tx_hash))
    }

    // == Simulation Results ==
    /// Caches a simulation result for 1 hour; simulations go stale fast.
    pub fn cache_simulation_result<T: Serialize>(&self, tx_hash: &str, result: &T) -> PutOutcome {
        self.simulations
            .put(&simulation_key(tx_hash), result, Some(SIMULATION_RESULTS_TTL))
    }

    /// Looks up a previously cached simulation result.
    pub fn simulation_result<T: DeserializeOwned>(&self, tx_hash: &str) -> Option<T> {
        self.simulations.get(&simulation_key(tx_hash))
    }
}

// == Key Builders ==
fn contract_name_key(address: &str) -> String {
    format!("contract_name_{}", address.to_lowercase())
}

fn tx_trace_key(tx_hash: &str) -> String {
    format!("tx_trace_{}", tx_hash.to_lowercase())
}

fn simulation_key(tx_hash: &str) -> String {
    format!("simulation_{}", tx_hash.to_lowercase())
}

// == Prefix Validation ==
fn validate_disjoint_prefixes(prefixes: &[&str]) -> Result<()> {
    for (i, a) in prefixes.iter().enumerate() {
        for b in prefixes.iter().skip(i + 1) {
            if a.starts_with(b) || b.starts_with(a) {
                return Err(CacheError::InvalidConfig(format!(
                    "key prefixes '{}' and '{}' overlap",
                    a, b
                )));
            }
        }
    }
    Ok(())
}
