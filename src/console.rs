//! Operator console: one backend, its mirrored configuration and status
//!
//! Group mapping edits save as soon as they are made. Every other setting is
//! staged locally and saved together by [`Console::save_settings`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::{ConfigDocument, ConfigMirror, GroupMappingEntry, GroupMappingProjection};
use crate::constants::keys::GROUP_MAPPING;
use crate::error::TransportError;
use crate::gateway::Gateway;
use crate::notification::NotificationSink;
use crate::status::StatusPoller;

pub struct Console {
    mirror: ConfigMirror,
    mappings: GroupMappingProjection,
    poller: StatusPoller,
    notifications: NotificationSink,
    /// Setting edits not yet saved
    staged: ConfigDocument,
}

impl Console {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let notifications = NotificationSink::new();
        Self {
            mirror: ConfigMirror::new(Arc::clone(&gateway), notifications.clone()),
            mappings: GroupMappingProjection::new(),
            poller: StatusPoller::new(gateway, notifications.clone()),
            notifications,
            staged: ConfigDocument::new(),
        }
    }

    /// Create the console and fetch status and configuration once
    ///
    /// Fetch failures are notified, not returned: the console still opens.
    pub async fn open(gateway: Arc<dyn Gateway>) -> Self {
        let mut console = Self::new(gateway);
        if console.poller.refresh().await.is_err() {
            warn!("Console opened without a status snapshot");
        }
        if console.reload().await.is_err() {
            warn!("Console opened without configuration");
        }
        console
    }

    pub fn mirror(&self) -> &ConfigMirror {
        &self.mirror
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn poller_mut(&mut self) -> &mut StatusPoller {
        &mut self.poller
    }

    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    pub fn mappings(&self) -> &[GroupMappingEntry] {
        self.mappings.entries()
    }

    pub fn staged(&self) -> &ConfigDocument {
        &self.staged
    }

    /// Re-fetch the configuration and rebuild the mapping list
    pub async fn reload(&mut self) -> Result<(), TransportError> {
        self.mirror.load().await?;
        self.mappings.observe(&self.mirror);
        Ok(())
    }

    /// Stage a setting for the next save
    ///
    /// `GROUP_MAPPING` is edited through the mapping operations instead.
    pub fn stage_setting(&mut self, key: &str, value: Value) -> bool {
        if key == GROUP_MAPPING {
            warn!("GROUP_MAPPING cannot be staged, use the mapping operations");
            return false;
        }
        info!(key, value = %value, "Setting staged");
        self.staged = self.staged.merged(&ConfigDocument::new().with(key, value));
        true
    }

    /// Save staged settings; with nothing staged the current document is re-posted
    pub async fn save_settings(&mut self) -> Result<(), TransportError> {
        let staged = self.staged.clone();
        self.mirror.update(staged).await?;
        self.staged = ConfigDocument::new();
        self.mappings.observe(&self.mirror);
        Ok(())
    }

    /// Add a row and save it right away
    pub async fn add_mapping(&mut self, entry: GroupMappingEntry) -> Result<(), TransportError> {
        self.mappings.insert_blank();
        let index = self.mappings.entries().len() - 1;
        self.mappings.update_at(&mut self.mirror, index, entry).await
    }

    /// Add an empty row without saving
    pub fn add_blank_mapping(&mut self) {
        self.mappings.insert_blank();
    }

    pub async fn edit_mapping(&mut self, index: usize, entry: GroupMappingEntry) -> Result<(), TransportError> {
        self.mappings.update_at(&mut self.mirror, index, entry).await
    }

    pub async fn remove_mapping(&mut self, index: usize) -> Result<(), TransportError> {
        self.mappings.remove_at(&mut self.mirror, index).await
    }

    pub async fn trigger_sync(&self) -> Result<String, TransportError> {
        self.poller.trigger_sync().await
    }

    pub async fn refresh_status(&self) -> Result<(), TransportError> {
        self.poller.refresh().await.map(|_| ())
    }
}
