// src/config/mod.rs

//! Configuration loading and validation for ariawatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply CLI overrides (`loader.rs`).
//! - Validate and resolve it into [`Settings`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_cli_overrides, default_config_path, load_from_path, load_settings};
pub use model::{
    DownloadSection, LifecycleSection, LoggingSection, RawConfigFile, Settings, WatchSection,
    LINKS_FILE_TEMPLATE,
};
