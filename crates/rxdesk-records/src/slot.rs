//! Persisted slots.
//!
//! A slot is a single named entry holding the JSON text of a whole
//! collection. [`SlotStorage`] is the raw key/value backend; [`JsonSlot`]
//! turns one named slot into a [`Repository`] the stores can load from and
//! save to.

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SlotError;

/// Raw storage for named text slots.
pub trait SlotStorage {
    /// Read a slot. `Ok(None)` when the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the slot contents.
    fn put(&self, key: &str, value: &str) -> Result<(), SlotError>;
}

impl<S: SlotStorage + ?Sized> SlotStorage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SlotError> {
        (**self).put(key, value)
    }
}

impl<S: SlotStorage + ?Sized> SlotStorage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SlotError> {
        (**self).put(key, value)
    }
}

/// Slots kept in process memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let slots = self.slots.lock().expect("Slot lock poisoned");
        Ok(slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let mut slots = self.slots.lock().expect("Slot lock poisoned");
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slots stored as `<key>.json` files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSlots {
    dir: PathBuf,
}

impl JsonFileSlots {
    /// Use the default slot directory, `~/.local/share/rxdesk/slots`.
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Use a specific directory (created on first write).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rxdesk")
            .join("slots")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Default for JsonFileSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStorage for JsonFileSlots {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SlotError> {
        fs::create_dir_all(&self.dir)?;

        // Write next to the target and rename so readers never see half a file
        let path = self.slot_path(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Load/save collaborator for a whole collection.
pub trait Repository<T> {
    /// Load the persisted collection. `None` means there is nothing usable
    /// (missing, empty or malformed) and the caller should seed.
    fn load(&self) -> Option<Vec<T>>;

    /// Persist the full collection, replacing what was there.
    fn save(&self, records: &[T]) -> Result<(), SlotError>;
}

/// A [`Repository`] backed by one named slot holding a JSON array.
#[derive(Debug)]
pub struct JsonSlot<S, T> {
    storage: S,
    key: String,
    _record: PhantomData<fn() -> T>,
}

impl<S: SlotStorage, T> JsonSlot<S, T> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S, T> Repository<T> for JsonSlot<S, T>
where
    S: SlotStorage,
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Option<Vec<T>> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => {
                tracing::debug!(slot = %self.key, "Slot is empty");
                return None;
            }
            Err(e) => {
                tracing::warn!(slot = %self.key, "Failed to read slot: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                tracing::debug!(slot = %self.key, records = records.len(), "Loaded slot");
                Some(records)
            }
            Err(e) => {
                tracing::warn!(slot = %self.key, "Discarding malformed slot data: {}", e);
                None
            }
        }
    }

    fn save(&self, records: &[T]) -> Result<(), SlotError> {
        let json = serde_json::to_string(records)?;
        self.storage.put(&self.key, &json)?;
        tracing::debug!(slot = %self.key, records = records.len(), "Saved slot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_slots_get_put() {
        let slots = MemorySlots::new();
        assert!(slots.get("a").unwrap().is_none());

        slots.put("a", "[1,2]").unwrap();
        assert_eq!(slots.get("a").unwrap().as_deref(), Some("[1,2]"));

        slots.put("a", "[]").unwrap();
        assert_eq!(slots.get("a").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_json_slot_missing_and_malformed_load_as_none() {
        let slots = MemorySlots::new();
        let repo: JsonSlot<_, u32> = JsonSlot::new(&slots, "numbers");
        assert!(repo.load().is_none());

        slots.put("numbers", "{not json").unwrap();
        assert!(repo.load().is_none());

        slots.put("numbers", "   ").unwrap();
        assert!(repo.load().is_none());
    }

    #[test]
    fn test_json_slot_empty_array_is_not_missing() {
        let slots = MemorySlots::new();
        slots.put("numbers", "[]").unwrap();

        let repo: JsonSlot<_, u32> = JsonSlot::new(&slots, "numbers");
        assert_eq!(repo.load(), Some(Vec::new()));
    }

    #[test]
    fn test_json_file_slots_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let slots = JsonFileSlots::with_dir(dir.path().join("nested"));
        assert!(slots.get("prescriptions").unwrap().is_none());

        slots.put("prescriptions", "[1]").unwrap();
        assert_eq!(slots.get("prescriptions").unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("nested").join("prescriptions.json").exists());
        assert!(!dir.path().join("nested").join("prescriptions.json.tmp").exists());
    }
}
