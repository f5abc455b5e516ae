//! Settings store - persisted configuration record with change notification

use super::events::{SettingsEvent, SettingsHandler, Subscribers, Subscription};
use super::repository::KeyValueStore;
use crate::contract::{keys, Settings, SheetsError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Default storage key of the settings record
pub const DEFAULT_SETTINGS_KEY: &str = "harvest.settings";

/// Process-wide settings store
pub struct SettingsStore {
    backend: Arc<dyn KeyValueStore>,
    storage_key: String,
    subscribers: Subscribers,
    /// Serializes read-modify-write cycles on the record
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Create a store without touching persisted data
    pub fn new(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            backend,
            storage_key: storage_key.into(),
            subscribers: Subscribers::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store and run the legacy field migration once
    pub fn open(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let store = Self::new(backend, storage_key);
        store.migrate_legacy_fields();
        store
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Current settings; absent or unreadable data yields `None`
    pub fn load(&self) -> Option<Settings> {
        let raw = match self.backend.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "failed to read settings");
                return None;
            }
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "ignoring malformed settings");
                None
            }
        }
    }

    /// Current settings or an empty record
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_default()
    }

    /// Shallow-merge `partial` onto the stored record, persist, notify
    pub fn save(&self, partial: &Settings) -> Result<Settings, SheetsError> {
        let merged = {
            let _guard = self.write_lock.lock();
            let mut merged = self.load_or_default();
            merged.merge(partial);
            self.persist(&merged)?;
            merged
        };

        tracing::info!(
            fields = partial.as_map().len(),
            "settings saved"
        );
        self.subscribers.publish(&SettingsEvent::saved(merged.clone()));
        Ok(merged)
    }

    /// Remove the stored record and notify with `None`
    pub fn clear(&self) -> Result<(), SheetsError> {
        {
            let _guard = self.write_lock.lock();
            self.backend
                .remove(&self.storage_key)
                .map_err(|e| SheetsError::Storage(e.to_string()))?;
        }

        tracing::info!("settings cleared");
        self.subscribers.publish(&SettingsEvent::cleared());
        Ok(())
    }

    /// Register `handler` for every subsequent change
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SettingsEvent) + Send + Sync + 'static,
    {
        let handler: SettingsHandler = Arc::new(handler);
        self.subscribers.subscribe(handler)
    }

    /// Broadcast the persisted record after another context changed it
    pub fn notify_external_change(&self) {
        tracing::debug!(key = %self.storage_key, "external settings change");
        self.subscribers
            .publish(&SettingsEvent::external(self.load()));
    }

    /// Copy the legacy key column field into its canonical name.
    ///
    /// Best-effort: failures are logged and the legacy value stays readable
    /// through the alias lookup. Returns whether a migration was written.
    pub fn migrate_legacy_fields(&self) -> bool {
        let _guard = self.write_lock.lock();
        let Some(settings) = self.load() else {
            return false;
        };
        if settings.text(keys::ITEMS_KEY_COLUMN).is_some() {
            return false;
        }
        let Some(legacy) = settings.text(keys::LEGACY_KEY_COLUMN) else {
            return false;
        };

        let mut migrated = settings.clone();
        migrated.set(keys::ITEMS_KEY_COLUMN, legacy);
        match self.persist(&migrated) {
            Ok(()) => {
                tracing::info!(
                    from = keys::LEGACY_KEY_COLUMN,
                    to = keys::ITEMS_KEY_COLUMN,
                    "migrated legacy settings field"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "legacy settings migration failed");
                false
            }
        }
    }

    fn persist(&self, settings: &Settings) -> Result<(), SheetsError> {
        let raw = serde_json::to_string(settings)
            .map_err(|e| SheetsError::Storage(e.to_string()))?;
        self.backend
            .set(&self.storage_key, &raw)
            .map_err(|e| SheetsError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryKeyValueStore;
    use parking_lot::Mutex;
    use serde_json::json;

    fn store() -> (Arc<MemoryKeyValueStore>, SettingsStore) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = SettingsStore::new(backend.clone(), DEFAULT_SETTINGS_KEY);
        (backend, store)
    }

    #[test]
    fn test_load_empty() {
        let (_, store) = store();
        assert_eq!(store.load(), None);
        assert!(store.load_or_default().is_empty());
    }

    #[test]
    fn test_malformed_record_is_absent() {
        let (backend, store) = store();
        backend.set(DEFAULT_SETTINGS_KEY, "{not json").unwrap();
        assert_eq!(store.load(), None);

        backend.set(DEFAULT_SETTINGS_KEY, "[1, 2]").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_merges_in_order() {
        let (_, store) = store();
        store
            .save(&Settings::new().with("proxyUrl", "https://a").with("language", "en"))
            .unwrap();
        let merged = store
            .save(&Settings::new().with("language", "nl").with("custom", true))
            .unwrap();

        let expected = Settings::new()
            .with("proxyUrl", "https://a")
            .with("language", "nl")
            .with("custom", true);
        assert_eq!(merged, expected);
        assert_eq!(store.load(), Some(expected));
    }

    /// Backend whose reads stall, widening the read-modify-write window
    struct SlowReadStore {
        inner: MemoryKeyValueStore,
        delay: std::time::Duration,
    }

    impl KeyValueStore for SlowReadStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            std::thread::sleep(self.delay);
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_concurrent_saves_keep_both_fields() {
        let backend = Arc::new(SlowReadStore {
            inner: MemoryKeyValueStore::new(),
            delay: std::time::Duration::from_millis(50),
        });
        let store = Arc::new(SettingsStore::new(backend, DEFAULT_SETTINGS_KEY));

        let handles: Vec<_> = [
            Settings::new().with("language", "nl"),
            Settings::new().with("proxyUrl", "https://p"),
        ]
        .into_iter()
        .map(|partial| {
            let store = store.clone();
            std::thread::spawn(move || store.save(&partial).unwrap())
        })
        .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let settings = store.load().unwrap();
        assert_eq!(settings.language(), Some("nl"));
        assert_eq!(settings.proxy_url(), Some("https://p"));
    }

    #[test]
    fn test_save_and_clear_notify() {
        let (_, store) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(move |event| sink.lock().push(event.settings.clone()));

        store.save(&Settings::new().with("language", "en")).unwrap();
        store.clear().unwrap();
        assert!(subscription.unsubscribe());
        store.save(&Settings::new().with("language", "fr")).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Some(Settings::new().with("language", "en")));
        assert_eq!(seen[1], None);
    }

    #[test]
    fn test_external_change_rereads_record() {
        let (backend, store) = store();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let _subscription = store.subscribe(move |event| *sink.lock() = Some(event.clone()));

        backend
            .set(DEFAULT_SETTINGS_KEY, &json!({"language": "de"}).to_string())
            .unwrap();
        store.notify_external_change();

        let event = seen.lock().clone().unwrap();
        assert_eq!(event, SettingsEvent::external(Some(Settings::new().with("language", "de"))));
    }

    #[test]
    fn test_open_migrates_legacy_key_column() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend
            .set(DEFAULT_SETTINGS_KEY, &json!({"keyColumn": "Code"}).to_string())
            .unwrap();

        let store = SettingsStore::open(backend, DEFAULT_SETTINGS_KEY);
        let settings = store.load().unwrap();

        assert_eq!(settings.text("itemsKeyColumn"), Some("Code"));
        // legacy field is kept
        assert_eq!(settings.text("keyColumn"), Some("Code"));
        assert!(!store.migrate_legacy_fields());
    }

    #[test]
    fn test_migration_keeps_canonical_value() {
        let (_, store) = store();
        store
            .save(
                &Settings::new()
                    .with("keyColumn", "Old")
                    .with("itemsKeyColumn", "New"),
            )
            .unwrap();

        assert!(!store.migrate_legacy_fields());
        assert_eq!(store.load().unwrap().items_key_column(), Some("New"));
    }
}
