//! Configuration module for tui-capture.
//!
//! This module wires together the data models and the loading/validation helpers
//! used throughout the crate.
//!
//! Example:
//! use tui_capture::config::{Config, load_from_path};
//!
//! let cfg = load_from_path("sequence.toml")?;

pub mod loader;
pub mod models;

// Re-export core data models
pub use models::{
    ActionDef, ActionKind, Config, DEFAULT_CAPTURE_PREFIX, Size, UNSAFE_PREFIX_CHARS,
    selector_for_label,
};

// Re-export loader utilities
pub use loader::{
    check_capture_prefix, generate_schema, load_from_path, load_from_path_async, load_from_str,
    validate_config, validate_table, write_schema_to_writer,
};
