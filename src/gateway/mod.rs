//! Client side of the sync backend's REST API
//!
//! [`Gateway`] is the seam between reconciliation logic and transport:
//! [`HttpGateway`] talks JSON over HTTP, tests swap in an in-memory backend.

use async_trait::async_trait;

use crate::config::ConfigDocument;
use crate::error::TransportError;
use crate::status::StatusSnapshot;

mod http;
mod messages;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpGateway;
pub use messages::{StatusReport, SyncResponse, UpdateConfigResponse};

/// The four operations the backend exposes
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /config`
    async fn fetch_config(&self) -> Result<ConfigDocument, TransportError>;

    /// `POST /config` with the full document; returns the stored document
    async fn store_config(&self, document: &ConfigDocument) -> Result<ConfigDocument, TransportError>;

    /// `GET /status`
    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError>;

    /// `POST /sync`; returns the backend's acknowledgement message
    async fn trigger_sync(&self) -> Result<String, TransportError>;
}
