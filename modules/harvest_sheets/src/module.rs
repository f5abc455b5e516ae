//! Module wiring - builds the stores, transport, service and client

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::SheetsApi;
use crate::domain::{ActionTransport, HarvestPhotoStore, KeyValueStore, Service, SettingsStore};
use crate::infra::storage::FileKeyValueStore;
use crate::infra::ReqwestTransport;
use anyhow::Result;
use std::sync::Arc;

/// Harvest sheets module: the explicit context object handed to UI layers
pub struct HarvestSheetsModule {
    config: Config,
    settings: Arc<SettingsStore>,
    photos: Arc<HarvestPhotoStore>,
    service: Arc<Service>,
    client: Arc<dyn SheetsApi>,
}

impl HarvestSheetsModule {
    /// File-backed stores under `config.data_dir`, reqwest transport
    pub fn init(config: Config) -> Result<Self> {
        let backend: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
        let transport: Arc<dyn ActionTransport> = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_parts(config, backend, transport))
    }

    /// Wire the module from caller-provided persistence and transport
    pub fn with_parts(
        config: Config,
        backend: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ActionTransport>,
    ) -> Self {
        let settings = Arc::new(SettingsStore::open(backend.clone(), config.settings_key.clone()));
        let photos = Arc::new(HarvestPhotoStore::new(backend, config.photos_key.clone()));
        let service = Arc::new(Service::new(
            settings.clone(),
            transport,
            config.timeouts.clone(),
            config.cache.clone(),
        ));
        let client: Arc<dyn SheetsApi> = Arc::new(NativeClient::new(service.clone()));

        tracing::info!(
            data_dir = %config.data_dir.display(),
            configured = settings.load().is_some_and(|s| s.proxy_url().is_some()),
            "harvest sheets module initialized"
        );

        Self {
            config,
            settings,
            photos,
            service,
            client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn photos(&self) -> &Arc<HarvestPhotoStore> {
        &self.photos
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn client(&self) -> Arc<dyn SheetsApi> {
        self.client.clone()
    }
}
