//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the console, providing a single source of truth for constant values.

/// Sync backend endpoints
pub mod gateway {
    /// Base URL of the sync backend when nothing else is configured
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

    /// Configuration document (GET to read, POST to replace)
    pub const CONFIG_PATH: &str = "/config";

    /// Last sync run report
    pub const STATUS_PATH: &str = "/status";

    /// Starts a sync run in the background
    pub const SYNC_PATH: &str = "/sync";

    /// Per-request timeout
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
}

/// Timer cadences
pub mod timing {
    /// Status auto-refresh period
    pub const AUTO_REFRESH_INTERVAL_MS: u64 = 5_000;

    /// How long a notification stays visible
    pub const NOTIFICATION_DURATION_MS: u64 = 3_000;
}

/// Operator-facing notification texts
pub mod messages {
    pub const STATUS_FETCH_FAILED: &str = "Failed to fetch sync status";
    pub const CONFIG_FETCH_FAILED: &str = "Failed to fetch configuration";
    pub const SYNC_TRIGGER_FAILED: &str = "Failed to trigger synchronization";
    pub const CONFIG_UPDATE_FAILED: &str = "Failed to update configuration";
    pub const CONFIG_SAVED: &str = "The new configuration has been saved";
}

/// Configuration keys known to the sync backend
///
/// Only `GROUP_MAPPING` carries meaning for reconciliation. The rest are listed
/// so the console can print settings in a familiar order.
pub mod keys {
    pub const GROUP_MAPPING: &str = "GROUP_MAPPING";
    pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";
    pub const APPLY_GROUP_MAPPING_TO_PARENTS: &str = "APPLY_GROUP_MAPPING_TO_PARENTS";
    pub const APPLY_DEFAULT_GROUP_TO_PARENTS: &str = "APPLY_DEFAULT_GROUP_TO_PARENTS";
    pub const RUN_SCHEDULE: &str = "RUN_SCHEDULE";
    pub const NOTIFICATION_EMAIL: &str = "NOTIFICATION_EMAIL";
    pub const DRY_RUN: &str = "DRY_RUN";

    /// Display order for `config show`
    pub const DISPLAY_ORDER: &[&str] = &[
        DEFAULT_GROUP,
        APPLY_GROUP_MAPPING_TO_PARENTS,
        APPLY_DEFAULT_GROUP_TO_PARENTS,
        RUN_SCHEDULE,
        NOTIFICATION_EMAIL,
        DRY_RUN,
    ];
}

/// Console settings file location
pub mod settings {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "carddav-sync-console";

    /// Settings file name
    pub const FILENAME: &str = "console.toml";

    /// Environment variable overriding the log level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}
