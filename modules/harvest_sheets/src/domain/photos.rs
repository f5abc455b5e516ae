//! Harvest photo store
//!
//! Photos captured offline are kept per item key, in capture order, inside a
//! single persisted map. Records are append-only; only a whole item or the
//! whole store can be deleted.

use super::repository::KeyValueStore;
use crate::contract::{HarvestPhoto, SheetsError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default storage key of the photo map
pub const DEFAULT_PHOTOS_KEY: &str = "harvest.photos";

type PhotoMap = BTreeMap<String, Vec<HarvestPhoto>>;

pub struct HarvestPhotoStore {
    backend: Arc<dyn KeyValueStore>,
    storage_key: String,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl HarvestPhotoStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            backend,
            storage_key: storage_key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Every stored photo, keyed by item
    pub fn all(&self) -> PhotoMap {
        let raw = match self.backend.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PhotoMap::new(),
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "failed to read photos");
                return PhotoMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = %self.storage_key, error = %e, "ignoring malformed photo store");
            PhotoMap::new()
        })
    }

    /// Photos for one item, oldest first
    pub fn photos(&self, item_key: &str) -> Vec<HarvestPhoto> {
        self.all().remove(item_key.trim()).unwrap_or_default()
    }

    /// Record a photo for `item_key`, stamped with the current time
    pub fn append(&self, item_key: &str, data_url: impl Into<String>) -> Result<HarvestPhoto, SheetsError> {
        let item_key = required_key(item_key)?;
        let photo = HarvestPhoto {
            data_url: data_url.into(),
            ts: chrono::Utc::now().timestamp_millis(),
        };

        let _guard = self.write_lock.lock();
        let mut map = self.all();
        map.entry(item_key.to_string())
            .or_default()
            .push(photo.clone());
        self.persist(&map)?;

        tracing::debug!(item = item_key, "harvest photo stored");
        Ok(photo)
    }

    /// Delete all photos of one item; returns whether any existed
    pub fn remove_item(&self, item_key: &str) -> Result<bool, SheetsError> {
        let item_key = required_key(item_key)?;

        let _guard = self.write_lock.lock();
        let mut map = self.all();
        if map.remove(item_key).is_none() {
            return Ok(false);
        }
        self.persist(&map)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), SheetsError> {
        let _guard = self.write_lock.lock();
        self.backend
            .remove(&self.storage_key)
            .map_err(|e| SheetsError::Storage(e.to_string()))
    }

    fn persist(&self, map: &PhotoMap) -> Result<(), SheetsError> {
        let raw = serde_json::to_string(map).map_err(|e| SheetsError::Storage(e.to_string()))?;
        self.backend
            .set(&self.storage_key, &raw)
            .map_err(|e| SheetsError::Storage(e.to_string()))
    }
}

fn required_key(item_key: &str) -> Result<&str, SheetsError> {
    let item_key = item_key.trim();
    if item_key.is_empty() {
        return Err(SheetsError::MissingArgument { argument: "key" });
    }
    Ok(item_key)
}
