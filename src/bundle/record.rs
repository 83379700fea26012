//! Bundle Record Module
//!
//! The persisted shape of one complete analysis session: the transaction,
//! its execution trace, and every contract name resolved along the way.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::current_timestamp_ms;

// == Analysis Bundle ==
/// A saved analysis session.
///
/// Bundles are user data: they carry no TTL, are never evicted, and only
/// explicit deletes remove them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    /// Unique bundle id, assigned at creation
    pub id: String,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Transaction hash the session analyzed
    pub tx_hash: String,
    /// Decoded transaction payload
    pub transaction_data: serde_json::Value,
    /// Step-by-step execution trace
    pub trace: serde_json::Value,
    /// Resolved (address, name) pairs
    pub contract_names: Vec<(String, String)>,
    /// Optional user-supplied description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AnalysisBundle {
    // == Constructor ==
    /// Creates a bundle stamped with the current time and a fresh id.
    ///
    /// # Arguments
    /// * `tx_hash` - Transaction hash the session analyzed
    /// * `transaction_data` - Decoded transaction payload
    /// * `trace` - Execution trace
    /// * `contract_names` - Resolved (address, name) pairs
    /// * `description` - Optional user-supplied description
    pub fn new(
        tx_hash: impl Into<String>,
        transaction_data: serde_json::Value,
        trace: serde_json::Value,
        contract_names: Vec<(String, String)>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: generate_bundle_id(),
            timestamp: current_timestamp_ms(),
            tx_hash: tx_hash.into(),
            transaction_data,
            trace,
            contract_names,
            description,
        }
    }
}

// == Id Generation ==
/// Builds a bundle id: creation time in Unix milliseconds plus a short
/// random suffix, so ids sort chronologically while staying unique within
/// one millisecond.
pub(crate) fn generate_bundle_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", current_timestamp_ms(), &suffix[..8])
}
