// src/config/validate.rs

use std::time::Duration;

use crate::cli::LogLevel;
use crate::config::model::{RawConfigFile, Settings};
use crate::errors::{AriawatchError, Result};
use crate::procs::default_editor_names;

impl TryFrom<RawConfigFile> for Settings {
    type Error = AriawatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let log_level = match raw.logging.level.as_deref() {
            Some(s) => Some(s.parse::<LogLevel>().map_err(|e| {
                AriawatchError::ConfigError(format!("[logging].level: {e}"))
            })?),
            None => None,
        };

        Ok(Settings {
            links_file: raw.watch.links_file,
            download_dir: raw.download.dir,
            executable: raw.download.executable.trim().to_string(),
            debounce_window: Duration::from_millis(raw.watch.debounce_ms),
            shutdown_timeout: Duration::from_secs(raw.lifecycle.shutdown_timeout_secs),
            open_editor: raw.lifecycle.open_editor,
            close_editors_on_exit: raw.lifecycle.close_editors_on_exit,
            editors: raw.lifecycle.editors.unwrap_or_else(default_editor_names),
            log_file: raw.logging.file,
            log_level,
        })
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(cfg)?;
    validate_download(cfg)?;
    validate_lifecycle(cfg)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.links_file.file_name().is_none() {
        return Err(AriawatchError::ConfigError(format!(
            "[watch].links_file must name a file (got {:?})",
            cfg.watch.links_file
        )));
    }

    if cfg.watch.debounce_ms == 0 {
        return Err(AriawatchError::ConfigError(
            "[watch].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_download(cfg: &RawConfigFile) -> Result<()> {
    if cfg.download.executable.trim().is_empty() {
        return Err(AriawatchError::ConfigError(
            "[download].executable must not be empty".to_string(),
        ));
    }

    if cfg.download.dir == cfg.watch.links_file {
        return Err(AriawatchError::ConfigError(format!(
            "[download].dir and [watch].links_file are the same path ({:?})",
            cfg.download.dir
        )));
    }

    Ok(())
}

fn validate_lifecycle(cfg: &RawConfigFile) -> Result<()> {
    if cfg.lifecycle.shutdown_timeout_secs == 0 {
        return Err(AriawatchError::ConfigError(
            "[lifecycle].shutdown_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
