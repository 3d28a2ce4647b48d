//! Configuration management for the sync console
//!
//! This module covers two kinds of configuration:
//! - **document / mirror / group_mapping**: the sync backend's configuration,
//!   mirrored locally and edited through the console
//! - **settings**: the console's own TOML settings (backend URL, timeouts)

pub mod document;
pub mod group_mapping;
pub mod mirror;
pub mod settings;

// Re-export commonly used types
pub use document::{ConfigDocument, parse_value};
pub use group_mapping::{GroupMappingEntry, GroupMappingList, GroupMappingProjection};
pub use mirror::ConfigMirror;
pub use settings::ConsoleSettings;
