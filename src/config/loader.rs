// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::model::{RawConfigFile, Settings};
use crate::errors::{AriawatchError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_settings`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Resolve the effective settings for a run.
///
/// - An explicit `--config` must exist.
/// - Without `--config`, [`default_config_path`] is used if present,
///   otherwise built-in defaults.
/// - CLI flags override whatever the file says.
/// - The result is validated.
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path).map_err(|e| {
            AriawatchError::ConfigError(format!("failed to load config {:?}: {e}", path))
        })?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                load_from_path(&default_path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    apply_cli_overrides(&mut raw, args);
    Settings::try_from(raw)
}

/// Apply command-line overrides on top of a raw config.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(ref links_file) = args.links_file {
        raw.watch.links_file = links_file.clone();
    }
    if let Some(ref dir) = args.download_dir {
        raw.download.dir = dir.clone();
    }
    if let Some(ms) = args.debounce_ms {
        raw.watch.debounce_ms = ms;
    }
    if args.no_editor || args.once {
        raw.lifecycle.open_editor = false;
    }
    if args.keep_editors || args.once {
        raw.lifecycle.close_editors_on_exit = false;
    }
}

/// Config file looked up in the working directory when `--config` is absent.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Ariawatch.toml")
}
