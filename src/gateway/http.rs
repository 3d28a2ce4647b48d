//! HTTP transport for the sync backend
//!
//! ureq is blocking, so each exchange runs on tokio's blocking pool and the
//! caller only awaits the result.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::Gateway;
use super::messages::{StatusReport, SyncResponse, UpdateConfigResponse};
use crate::config::ConfigDocument;
use crate::constants::gateway::{CONFIG_PATH, STATUS_PATH, SYNC_PATH};
use crate::error::TransportError;
use crate::status::StatusSnapshot;

/// JSON-over-HTTP client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and decode the JSON body of a 2xx answer
    async fn exchange<T>(
        &self,
        method: &'static str,
        path: &'static str,
        body: Option<serde_json::Value>,
    ) -> Result<T, TransportError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = self.url(path);
        debug!(method, url = %url, "Gateway request");

        tokio::task::spawn_blocking(move || -> Result<T, TransportError> {
            let request = agent.request(method, &url);
            let response = match body {
                Some(body) => request.send_json(body)?,
                None => request.call()?,
            };
            let text = response
                .into_string()
                .map_err(|e| TransportError::Network(format!("failed to read response body: {e}")))?;
            Ok(serde_json::from_str::<T>(&text)?)
        })
        .await
        .map_err(|e| TransportError::Network(format!("request task failed: {e}")))?
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_config(&self) -> Result<ConfigDocument, TransportError> {
        self.exchange("GET", CONFIG_PATH, None).await
    }

    async fn store_config(&self, document: &ConfigDocument) -> Result<ConfigDocument, TransportError> {
        let body = serde_json::to_value(document)?;
        let response: UpdateConfigResponse = self.exchange("POST", CONFIG_PATH, Some(body)).await?;
        Ok(response.new_config)
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        let report: StatusReport = self.exchange("GET", STATUS_PATH, None).await?;
        Ok(report.into())
    }

    async fn trigger_sync(&self) -> Result<String, TransportError> {
        let response: SyncResponse = self.exchange("POST", SYNC_PATH, None).await?;
        Ok(response.message)
    }
}
