//! Sled-Backed Substrate
//!
//! Durable implementation of the [`Storage`] contract over an embedded
//! sled tree. This is the substrate a desktop or server host points the
//! caching layer at when analysis data must survive restarts.

use std::path::Path;

use super::{Storage, StorageError};

/// POSIX "no space left on device", the only capacity signal sled surfaces.
const ENOSPC: i32 = 28;

// == Sled Storage ==
/// Durable substrate backed by a [`sled::Tree`].
///
/// Keys and values are stored as UTF-8 bytes. sled batches writes to
/// disk on its own schedule; call [`SledStorage::flush`] when a host
/// needs the current state on disk before proceeding.
#[derive(Debug, Clone)]
pub struct SledStorage {
    tree: sled::Tree,
}

impl SledStorage {
    // == Constructors ==
    /// Opens (or creates) a database at `path` and uses its default tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(map_sled_error)?;
        Ok(Self {
            tree: db.open_tree("analysis_cache").map_err(map_sled_error)?,
        })
    }

    /// Uses a named tree inside an already-open database, for hosts that
    /// keep other data in the same sled instance.
    pub fn in_db(db: &sled::Db, tree_name: &str) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(tree_name).map_err(map_sled_error)?,
        })
    }

    /// Forces buffered writes onto disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.tree.flush().map_err(map_sled_error)?;
        Ok(())
    }
}

impl Storage for SledStorage {
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.tree
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(map_sled_error)?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let ivec = self.tree.get(key.as_bytes()).map_err(map_sled_error)?;
        // Undecodable bytes surface as replacement characters; the layer
        // above treats payloads that no longer parse as corruption.
        Ok(ivec.map(|v| String::from_utf8_lossy(&v).into_owned()))
    }

    fn remove_raw(&self, key: &str) -> Result<(), StorageError> {
        self.tree.remove(key.as_bytes()).map_err(map_sled_error)?;
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for item in self.tree.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item.map_err(map_sled_error)?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }
}

/// Maps sled failures onto the substrate error taxonomy.
fn map_sled_error(err: sled::Error) -> StorageError {
    match &err {
        sled::Error::Io(io) if io.raw_os_error() == Some(ENOSPC) => {
            StorageError::Full(err.to_string())
        }
        _ => StorageError::Denied(err.to_string()),
    }
}
