//! Common test utilities: scripted transport and a configured module
#![allow(dead_code)]

use async_trait::async_trait;
use harvest_sheets::config::Config;
use harvest_sheets::domain::{ActionRequest, ActionTransport};
use harvest_sheets::infra::storage::MemoryKeyValueStore;
use harvest_sheets::{HarvestSheetsModule, Settings, SheetsError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const PROXY_URL: &str = "https://proxy.example/exec";

/// Transport that records every request and replays scripted bodies
pub struct MockTransport {
    calls: Mutex<Vec<(String, ActionRequest)>>,
    queued: Mutex<VecDeque<Value>>,
    fallback: Value,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            fallback: json!({"ok": true}),
            delay: None,
        }
    }

    /// Body returned once the queue is empty
    pub fn respond_with(mut self, body: Value) -> Self {
        self.fallback = body;
        self
    }

    /// Hold every response for `delay` (virtual time under paused tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_response(&self, body: Value) {
        self.queued.lock().push_back(body);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.calls.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn last_request(&self) -> ActionRequest {
        self.calls
            .lock()
            .last()
            .map(|(_, r)| r.clone())
            .expect("no request was sent")
    }

    pub fn last_url(&self) -> String {
        self.calls
            .lock()
            .last()
            .map(|(url, _)| url.clone())
            .expect("no request was sent")
    }
}

#[async_trait]
impl ActionTransport for MockTransport {
    async fn send(&self, proxy_url: &str, request: &ActionRequest) -> Result<Value, SheetsError> {
        self.calls
            .lock()
            .push((proxy_url.to_string(), request.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queued.lock().pop_front();
        Ok(queued.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Settings with every sheet family configured
pub fn configured_settings() -> Settings {
    Settings::new()
        .with("proxyUrl", PROXY_URL)
        .with("itemsSpreadsheetId", "items-sheet-id")
        .with("itemsSheetName", "Varieties")
        .with("itemsKeyColumn", "Variety ID")
        .with("harvestSpreadsheetId", "harvest-sheet-id")
        .with("harvestSheetName", "Harvest 2026")
        .with("storageSpreadsheetId", "storage-sheet-id")
        .with("bagStorageSheetName", "Bags")
        .with("binStorageSheetName", "Bins")
        .with("packingSpreadsheetId", "packing-sheet-id")
        .with("packingOrSheetName", "Packing OR")
        .with("packingGraftingSheetName", "Packing Grafting")
        .with("language", "en")
}

pub struct Harness {
    pub module: HarvestSheetsModule,
    pub transport: Arc<MockTransport>,
}

/// Module over in-memory storage with `settings` pre-saved (if any)
pub fn harness(settings: Option<Settings>, transport: MockTransport) -> Harness {
    harness_with_config(Config::default(), settings, transport)
}

pub fn harness_with_config(
    config: Config,
    settings: Option<Settings>,
    transport: MockTransport,
) -> Harness {
    let transport = Arc::new(transport);
    let backend = Arc::new(MemoryKeyValueStore::new());
    let module = HarvestSheetsModule::with_parts(config, backend, transport.clone());

    if let Some(settings) = settings {
        module
            .settings()
            .save(&settings)
            .expect("failed to seed settings");
    }

    Harness { module, transport }
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// `json!` object literal as a field map
pub fn fields(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().expect("expected a JSON object")
}
