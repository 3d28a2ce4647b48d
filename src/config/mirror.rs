//! Local mirror of the backend configuration
//!
//! The mirror is the only owner of the authoritative [`ConfigDocument`].
//! Partial updates are shallow-merged over the current document, sent in
//! full, and the document the backend answers with replaces the mirror.
//! A failed request leaves the mirror exactly as it was.

use std::sync::Arc;

use tracing::{info, warn};

use super::document::ConfigDocument;
use crate::constants::messages::{CONFIG_FETCH_FAILED, CONFIG_SAVED, CONFIG_UPDATE_FAILED};
use crate::error::TransportError;
use crate::gateway::Gateway;
use crate::notification::NotificationSink;

pub struct ConfigMirror {
    gateway: Arc<dyn Gateway>,
    notifications: NotificationSink,
    document: Option<ConfigDocument>,
    /// Bumped every time `document` is replaced
    revision: u64,
}

impl ConfigMirror {
    pub fn new(gateway: Arc<dyn Gateway>, notifications: NotificationSink) -> Self {
        Self {
            gateway,
            notifications,
            document: None,
            revision: 0,
        }
    }

    /// Last document adopted from the backend, if any
    pub fn document(&self) -> Option<&ConfigDocument> {
        self.document.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn adopt(&mut self, document: ConfigDocument) -> &ConfigDocument {
        self.revision += 1;
        self.document.insert(document)
    }

    /// Fetch the full document from the backend
    pub async fn load(&mut self) -> Result<&ConfigDocument, TransportError> {
        match self.gateway.fetch_config().await {
            Ok(document) => {
                info!(keys = document.len(), "Configuration loaded");
                Ok(self.adopt(document))
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch configuration");
                self.notifications.failure(CONFIG_FETCH_FAILED);
                Err(err)
            }
        }
    }

    /// Merge `partial` over the current document and store the result
    pub async fn update(&mut self, partial: ConfigDocument) -> Result<&ConfigDocument, TransportError> {
        let merged = match &self.document {
            Some(current) => current.merged(&partial),
            None => partial,
        };

        match self.gateway.store_config(&merged).await {
            Ok(stored) => {
                info!(keys = stored.len(), "Configuration updated");
                self.notifications.success(CONFIG_SAVED);
                Ok(self.adopt(stored))
            }
            Err(err) => {
                warn!(error = %err, "Failed to update configuration");
                self.notifications.failure(CONFIG_UPDATE_FAILED);
                Err(err)
            }
        }
    }
}
