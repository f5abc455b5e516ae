//! Domain layer - settings, caching and request orchestration

pub mod cache;
pub mod envelope;
pub mod events;
pub mod photos;
pub mod repository;
pub mod resolve;
pub mod service;
pub mod settings;

pub use cache::TtlCache;
pub use envelope::{actions, decode_envelope, ActionRequest};
pub use events::{ChangeSource, SettingsEvent, Subscription};
pub use photos::HarvestPhotoStore;
pub use repository::{ActionTransport, KeyValueStore};
pub use service::Service;
pub use settings::SettingsStore;
