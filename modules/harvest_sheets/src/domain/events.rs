/// Settings change notification
///
/// Every settings mutation is broadcast to subscribers:
/// - Local events: a save or clear through this store
/// - External events: another context wrote the same persisted key and the
///   host forwarded the storage-change signal
///
/// Delivery is synchronous, on the mutating thread, in subscription order.

use crate::contract::Settings;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Where a settings change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    /// Saved or cleared through this store
    Local,
    /// Written by another context sharing the persisted record
    External,
}

/// Settings change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsEvent {
    /// Latest settings, `None` after a clear
    pub settings: Option<Settings>,
    pub source: ChangeSource,
}

impl SettingsEvent {
    pub fn saved(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
            source: ChangeSource::Local,
        }
    }

    pub fn cleared() -> Self {
        Self {
            settings: None,
            source: ChangeSource::Local,
        }
    }

    pub fn external(settings: Option<Settings>) -> Self {
        Self {
            settings,
            source: ChangeSource::External,
        }
    }
}

/// Subscriber callback
pub type SettingsHandler = Arc<dyn Fn(&SettingsEvent) + Send + Sync>;

type HandlerList = RwLock<Vec<(u64, SettingsHandler)>>;

/// Explicit subscription list
#[derive(Default)]
pub struct Subscribers {
    handlers: Arc<HandlerList>,
    next_id: AtomicU64,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: SettingsHandler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, handler));
        Subscription {
            id,
            handlers: Arc::downgrade(&self.handlers),
        }
    }

    /// Deliver `event` to every handler registered at call time
    pub fn publish(&self, event: &SettingsEvent) {
        // snapshot so handlers may subscribe or unsubscribe while running
        let snapshot: Vec<SettingsHandler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`; dropping it keeps the handler registered
pub struct Subscription {
    id: u64,
    handlers: Weak<HandlerList>,
}

impl Subscription {
    /// Remove the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(handlers) = self.handlers.upgrade() else {
            return false;
        };
        let mut handlers = handlers.write();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != self.id);
        handlers.len() != before
    }
}
