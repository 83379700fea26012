//! Durable Key/Value Substrate
//!
//! The flat, string-keyed, string-valued store underneath every cache
//! instance and the bundle store. The substrate knows nothing about
//! TTLs, envelopes or bundles; it only persists strings under keys and
//! enumerates keys by prefix. All higher-level semantics (expiry,
//! eviction, namespace isolation) live above this boundary.
//!
//! Implementations must provide per-key atomicity: a single `set_raw`,
//! `get_raw` or `remove_raw` is observed entirely or not at all. No
//! cross-key transaction is ever required of them.

mod memory;
mod sled_store;

pub use memory::MemoryStorage;
pub use sled_store::SledStorage;

use thiserror::Error;

// == Storage Error Enum ==
/// Failure modes of the durable substrate.
///
/// Reads and writes share the same taxonomy: either the store has no
/// room left, or the store refused/failed the operation (permissions,
/// I/O faults, poisoned state).
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store has reached its capacity and cannot accept the write
    #[error("storage full: {0}")]
    Full(String),

    /// The store refused or failed the operation
    #[error("storage denied: {0}")]
    Denied(String),
}

// == Storage Trait ==
/// Contract of the durable key/value substrate.
///
/// Object safe: consumers share one substrate as `Arc<dyn Storage>`.
/// Every method is synchronous. The substrates this crate ships
/// (an in-process map, an embedded sled tree) complete in-process, so
/// callers above never need a suspension point for them.
pub trait Storage: Send + Sync {
    /// Stores `value` under `key`, overwriting any previous value.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Returns the value stored under `key`, or `None` if absent.
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_raw(&self, key: &str) -> Result<(), StorageError>;

    /// Returns every key starting with `prefix`, in unspecified order.
    ///
    /// An empty prefix enumerates the whole store.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
