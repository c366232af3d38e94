// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ProcessOutcome;

#[derive(Error, Debug)]
pub enum AriawatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cannot create download directory {path:?}: {source:#}")]
    DownloadDir {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("Cannot create links file {path:?}: {source:#}")]
    LinksFile {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("Download failed: {0}")]
    DownloadFailed(ProcessOutcome),

    #[error("File watcher error: {0}")]
    WatcherError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AriawatchError>;
