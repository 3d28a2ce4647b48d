//! Wire types for the sync backend's JSON endpoints

use serde::{Deserialize, Serialize};

use crate::config::ConfigDocument;
use crate::status::{StatusSnapshot, SyncState};

/// Response to `POST /config`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateConfigResponse {
    #[serde(default)]
    pub message: Option<String>,

    /// Configuration as stored by the backend (authoritative)
    pub new_config: ConfigDocument,
}

/// Response to `POST /sync`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SyncResponse {
    pub message: String,
}

/// Response to `GET /status`
///
/// Before the first run the backend reports `null` details and last run,
/// so every field is optional on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub last_run: Option<String>,
}

impl From<StatusReport> for StatusSnapshot {
    fn from(report: StatusReport) -> Self {
        StatusSnapshot {
            status: SyncState::from_label(report.status.as_deref().unwrap_or_default()),
            details: report.details.unwrap_or_default(),
            last_run: report.last_run.unwrap_or_default(),
        }
    }
}
