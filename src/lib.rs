#![forbid(unsafe_code)]

//! Client-side reconciliation for the CardDAV sync admin console
//!
//! - `config`: local mirror of the backend configuration and the editable
//!   group mapping list derived from it
//! - `status`: sync status snapshot with optional auto-refresh
//! - `notification`: single-slot, self-dismissing operator notifications
//! - `gateway`: the backend's REST API behind a trait
//! - `console`: the pieces wired together for one backend

pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod notification;
pub mod status;
pub mod timer;

pub use config::{ConfigDocument, ConfigMirror, ConsoleSettings, GroupMappingEntry, GroupMappingProjection};
pub use console::Console;
pub use error::TransportError;
pub use gateway::{Gateway, HttpGateway};
pub use notification::{Notification, NotificationKind, NotificationSink};
pub use status::{AutoRefresh, StatusPoller, StatusSnapshot, SyncState};
