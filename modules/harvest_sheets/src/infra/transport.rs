//! HTTP transport for the action proxy

use crate::contract::SheetsError;
use crate::domain::envelope::ActionRequest;
use crate::domain::repository::ActionTransport;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Posts envelopes as JSON with reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("harvest-sheets/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ActionTransport for ReqwestTransport {
    async fn send(&self, proxy_url: &str, request: &ActionRequest) -> Result<Value, SheetsError> {
        let response = self
            .client
            .post(proxy_url)
            .json(request)
            .send()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;

        // proxies may report `ok: false` with an error status; prefer the envelope
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(body),
            Err(_) if !status.is_success() => {
                Err(SheetsError::Transport(format!("HTTP {}", status)))
            }
            Err(e) => Err(SheetsError::InvalidResponse(e.to_string())),
        }
    }
}
