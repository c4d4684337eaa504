//! Shared error model, configuration, and text transforms for tabxml.
//!
//! This crate is the foundation depended on by the converter crates.
//! It provides:
//! - [`TabXmlError`] — the unified error type
//! - Text transforms ([`escape_markup`], [`pad_numeric_id`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod text;

/// Capacity of the bounded queue between a conversion producer task and
/// its consumer. Small on purpose: the queue exists for handoff and
/// backpressure, not buffering.
pub const QUEUE_DEPTH: usize = 16;

/// Initial capacity for line readers. Individual lines may exceed this
/// and readers grow as needed: biological sequence data routinely
/// carries megabyte-scale single lines.
pub const LINE_BUFFER_CAPACITY: usize = 1024 * 1024;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, TabXmlError};
pub use text::{PLACEHOLDER, escape_markup, is_all_digits, pad_numeric_id};
