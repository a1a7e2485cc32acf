//! Shared types, error model, and configuration for mdreader.
//!
//! This crate is the foundation depended on by all other mdreader crates.
//! It provides:
//! - [`MdReaderError`] — the unified error type
//! - Domain types ([`Document`], [`Metadata`])
//! - Configuration ([`AppConfig`], [`ReaderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ReaderConfig, config_dir, config_file_path, init_config, init_config_in,
    load_config, load_config_from, write_default_config,
};
pub use error::{MdReaderError, Result};
pub use types::{Document, Metadata};
