//! The local snapshot slot used for flow resumption.
//!
//! When a desktop-initiated flow completes on mobile, a JSON snapshot
//! of the measurements is written under a well-known key so a later
//! session on the same device can resume with precomputed data instead
//! of recapturing photos. The slot mirrors a browser's local storage:
//! string keys, string values, one value per key.

use std::collections::HashMap;
use std::path::PathBuf;

use saia_core::measurements::Measurements;

/// The storage slot holding the JSON-encoded [`Measurements`].
pub const STORAGE_KEY: &str = "saia-pf-widget-data";

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A local-storage-like key/value slot.
pub trait KeyValueStore: Send + Sync {
    fn put(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store, used in tests and by hosts that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// File-backed store: each key becomes `<dir>/<key>.json`.
///
/// Keys are well-known constants without path separators; the store is
/// not meant for arbitrary user-supplied keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot helpers
// ---------------------------------------------------------------------------

/// Write the measurement snapshot to the well-known slot.
pub fn save_measurements(
    store: &dyn KeyValueStore,
    measurements: &Measurements,
) -> Result<(), StorageError> {
    store.put(STORAGE_KEY, serde_json::to_string(measurements)?)
}

/// Read the measurement snapshot back, if one exists.
///
/// A malformed snapshot is treated as absent (logged, not fatal) so a
/// corrupted slot can never wedge the flow.
pub fn load_measurements(store: &dyn KeyValueStore) -> Result<Option<Measurements>, StorageError> {
    let Some(raw) = store.get(STORAGE_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(measurements) => Ok(Some(measurements)),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed measurement snapshot");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saia_core::types::Gender;

    fn measurements() -> Measurements {
        Measurements {
            hips: 95.0,
            chest: 90.0,
            waist: 70.0,
            gender: Gender::Male,
            height: 180.0,
        }
    }

    #[test]
    fn snapshot_round_trips_through_memory_store() {
        let store = MemoryStore::default();
        save_measurements(&store, &measurements()).unwrap();

        let loaded = load_measurements(&store).unwrap().unwrap();
        assert_eq!(loaded, measurements());
    }

    #[test]
    fn empty_slot_loads_as_none() {
        let store = MemoryStore::default();
        assert_eq!(load_measurements(&store).unwrap(), None);
    }

    #[test]
    fn malformed_snapshot_is_discarded() {
        let store = MemoryStore::default();
        store.put(STORAGE_KEY, "{not json".to_string()).unwrap();
        assert_eq!(load_measurements(&store).unwrap(), None);
    }

    #[test]
    fn remove_clears_the_slot() {
        let store = MemoryStore::default();
        save_measurements(&store, &measurements()).unwrap();
        store.remove(STORAGE_KEY).unwrap();
        assert_eq!(load_measurements(&store).unwrap(), None);
    }

    #[test]
    fn file_store_round_trips() {
        let dir = std::env::temp_dir().join(format!("saia-store-{}", std::process::id()));
        let store = FileStore::new(&dir);

        save_measurements(&store, &measurements()).unwrap();
        assert_eq!(load_measurements(&store).unwrap(), Some(measurements()));

        store.remove(STORAGE_KEY).unwrap();
        assert_eq!(load_measurements(&store).unwrap(), None);
        // Removing again is a no-op.
        store.remove(STORAGE_KEY).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
