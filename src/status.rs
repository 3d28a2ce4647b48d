//! Sync status snapshot and its poller
//!
//! The poller holds the latest [`StatusSnapshot`], refreshes it on demand and,
//! while auto-refresh is enabled, on a fixed cadence. Triggering a sync never
//! touches the snapshot; the effect shows up on the next refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::messages::{STATUS_FETCH_FAILED, SYNC_TRIGGER_FAILED};
use crate::constants::timing::AUTO_REFRESH_INTERVAL_MS;
use crate::error::TransportError;
use crate::gateway::Gateway;
use crate::notification::NotificationSink;
use crate::timer::{self, TimerHandle};

/// Outcome of the last sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Completed,
    InProgress,
    Error,
}

impl SyncState {
    /// Map the backend's status label; anything unrecognised is an error
    pub fn from_label(label: &str) -> Self {
        match label {
            "Completed" => SyncState::Completed,
            "In progress" => SyncState::InProgress,
            _ => SyncState::Error,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            SyncState::Completed => "Sync Successful",
            SyncState::InProgress => "Sync In Progress",
            SyncState::Error => "Sync Issue",
        }
    }
}

/// Point-in-time report of the remote sync job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: SyncState,
    pub details: String,
    pub last_run: String,
}

impl StatusSnapshot {
    pub fn description(&self) -> &str {
        if self.details.is_empty() {
            "Status unknown"
        } else {
            &self.details
        }
    }
}

/// Auto-refresh toggle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoRefresh {
    Disabled,
    Enabled,
}

/// State reachable from the scheduled refresh task
struct PollerShared {
    gateway: Arc<dyn Gateway>,
    notifications: NotificationSink,
    snapshot: watch::Sender<Option<StatusSnapshot>>,
}

impl PollerShared {
    async fn refresh(&self) -> Result<StatusSnapshot, TransportError> {
        match self.gateway.fetch_status().await {
            Ok(snapshot) => {
                debug!(status = ?snapshot.status, last_run = %snapshot.last_run, "Status refreshed");
                self.snapshot.send_replace(Some(snapshot.clone()));
                Ok(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch sync status");
                self.notifications.failure(STATUS_FETCH_FAILED);
                Err(err)
            }
        }
    }
}

pub struct StatusPoller {
    shared: Arc<PollerShared>,
    interval: Duration,
    /// Present exactly while auto-refresh is enabled
    schedule: Option<TimerHandle>,
}

impl StatusPoller {
    pub fn new(gateway: Arc<dyn Gateway>, notifications: NotificationSink) -> Self {
        Self::with_interval(gateway, notifications, Duration::from_millis(AUTO_REFRESH_INTERVAL_MS))
    }

    pub fn with_interval(gateway: Arc<dyn Gateway>, notifications: NotificationSink, interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            shared: Arc::new(PollerShared {
                gateway,
                notifications,
                snapshot,
            }),
            interval,
            schedule: None,
        }
    }

    /// Fetch the status once; on failure the previous snapshot stays
    pub async fn refresh(&self) -> Result<StatusSnapshot, TransportError> {
        self.shared.refresh().await
    }

    pub fn auto_refresh(&self) -> AutoRefresh {
        if self.schedule.is_some() {
            AutoRefresh::Enabled
        } else {
            AutoRefresh::Disabled
        }
    }

    /// Enable or disable periodic refresh
    ///
    /// Enabling twice keeps the running schedule; disabling cancels it, and a
    /// later enable starts a fresh one. Without a tokio runtime enabling has
    /// no effect.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        match (enabled, self.schedule.is_some()) {
            (true, false) => {
                let shared = Arc::clone(&self.shared);
                self.schedule = timer::schedule_every(self.interval, move || {
                    let shared = Arc::clone(&shared);
                    async move {
                        // Failures are already notified
                        let _ = shared.refresh().await;
                    }
                });
                if self.schedule.is_some() {
                    info!(interval_ms = self.interval.as_millis() as u64, "Auto-refresh enabled");
                }
            }
            (false, true) => {
                info!("Auto-refresh disabled");
                if let Some(schedule) = self.schedule.take() {
                    schedule.cancel();
                }
            }
            _ => {}
        }
    }

    /// Ask the backend to start a sync run and return its message
    pub async fn trigger_sync(&self) -> Result<String, TransportError> {
        match self.shared.gateway.trigger_sync().await {
            Ok(message) => {
                info!(message = %message, "Sync triggered");
                self.shared.notifications.success(message.clone());
                Ok(message)
            }
            Err(err) => {
                warn!(error = %err, "Failed to trigger synchronization");
                self.shared.notifications.failure(SYNC_TRIGGER_FAILED);
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        self.shared.snapshot.borrow().clone()
    }

    /// Watch snapshot replacements (manual and scheduled)
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusSnapshot>> {
        self.shared.snapshot.subscribe()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some(schedule) = self.schedule.take() {
            debug!("Status poller torn down, cancelling auto-refresh");
            schedule.cancel();
        }
    }
}
