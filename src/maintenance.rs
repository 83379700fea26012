//! Maintenance Module
//!
//! Operator surface over the whole substrate: aggregate statistics,
//! sweeps across every cache class, and cache clearing. Bundles are
//! reported on but never swept or cleared from here.

use serde::Serialize;
use tracing::info;

use crate::bundle::BundleStats;
use crate::cache::{CacheStats, CleanupReport};
use crate::error::Result;
use crate::named::AnalysisCaches;

// == Maintenance Report ==
/// Aggregate snapshot across all cache classes and the bundle store.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    /// Contract metadata cache footprint
    pub contracts: CacheStats,
    /// Transaction data cache footprint
    pub transactions: CacheStats,
    /// Simulation results cache footprint
    pub simulations: CacheStats,
    /// Bundle store footprint
    pub bundles: BundleStats,
}

impl MaintenanceReport {
    /// Total entries across every class, bundles included.
    pub fn total_entries(&self) -> usize {
        self.contracts.count + self.transactions.count + self.simulations.count + self.bundles.count
    }

    /// Total approximate payload bytes across every class.
    pub fn total_bytes(&self) -> usize {
        self.contracts.approx_bytes
            + self.transactions.approx_bytes
            + self.simulations.approx_bytes
            + self.bundles.approx_bytes
    }
}

// == Maintenance ==
/// Borrowing facade for operator tasks over an `AnalysisCaches`.
pub struct Maintenance<'a> {
    caches: &'a AnalysisCaches,
}

impl<'a> Maintenance<'a> {
    // == Constructor ==
    pub fn new(caches: &'a AnalysisCaches) -> Self {
        Self { caches }
    }

    // == Stats ==
    /// Collects a point-in-time report across every class.
    pub fn stats(&self) -> Result<MaintenanceReport> {
        Ok(MaintenanceReport {
            contracts: self.caches.contracts().stats(),
            transactions: self.caches.transactions().stats(),
            simulations: self.caches.simulations().stats(),
            bundles: self.caches.bundles().stats()?,
        })
    }

    // == Cleanup All ==
    /// Runs one maintenance sweep on every cache class.
    ///
    /// # Returns
    /// * `CleanupReport` - Combined removal counts across the classes
    pub fn cleanup_all(&self) -> CleanupReport {
        let mut combined = CleanupReport::default();

        for cache in [
            self.caches.contracts(),
            self.caches.transactions(),
            self.caches.simulations(),
        ] {
            let report = cache.cleanup();
            combined.expired += report.expired;
            combined.evicted += report.evicted;
            combined.corrupted += report.corrupted;
        }

        info!(
            "Full cleanup: {} entries removed across all caches",
            combined.total_removed()
        );
        combined
    }

    // == Clear Caches ==
    /// Empties every cache class. Saved bundles are untouched.
    pub fn clear_caches(&self) {
        self.caches.contracts().clear();
        self.caches.transactions().clear();
        self.caches.simulations().clear();
        info!("Cleared all cache classes");
    }
}
