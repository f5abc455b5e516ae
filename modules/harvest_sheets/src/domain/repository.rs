//! Persistence and transport traits
//!
//! These traits define the seams between the domain and the outside world.
//! Implementations are in infra/.

use super::envelope::ActionRequest;
use crate::contract::SheetsError;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// String key-value persistence (one serialized record per key)
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Delivery of action envelopes to the proxy
#[async_trait]
pub trait ActionTransport: Send + Sync {
    /// POST `request` to `proxy_url` and return the JSON response body.
    ///
    /// Envelope interpretation (`ok`, `error`) is left to the caller.
    async fn send(&self, proxy_url: &str, request: &ActionRequest) -> Result<Value, SheetsError>;
}
