// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::cli::LogLevel;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// links_file = "links.txt"
/// debounce_ms = 1000
///
/// [download]
/// dir = "downloads"
/// executable = "aria2c"
///
/// [lifecycle]
/// open_editor = true
/// close_editors_on_exit = true
/// shutdown_timeout_secs = 3
///
/// [logging]
/// file = "download_manager.log"
/// level = "warn"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw,
/// unvalidated form; convert it with `Settings::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub download: DownloadSection,

    #[serde(default)]
    pub lifecycle: LifecycleSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// The links file to watch, relative to the working directory.
    #[serde(default = "default_links_file")]
    pub links_file: PathBuf,

    /// Debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_links_file() -> PathBuf {
    PathBuf::from("links.txt")
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            links_file: default_links_file(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSection {
    /// Output directory passed to aria2c as `--dir`.
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,

    /// Downloader executable name (looked up on `PATH`) or path.
    #[serde(default = "default_executable")]
    pub executable: String,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_executable() -> String {
    "aria2c".to_string()
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
            executable: default_executable(),
        }
    }
}

/// `[lifecycle]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleSection {
    /// Open the links file in the default editor at startup.
    #[serde(default = "default_true")]
    pub open_editor: bool,

    /// Terminate known editor processes on exit.
    #[serde(default = "default_true")]
    pub close_editors_on_exit: bool,

    /// Editor process names to terminate; `None` uses the platform list.
    #[serde(default)]
    pub editors: Option<Vec<String>>,

    /// Upper bound for each shutdown wait (watcher, in-flight download).
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_shutdown_timeout_secs() -> u64 {
    3
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            open_editor: true,
            close_editors_on_exit: true,
            editors: None,
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// `"error"`, `"warn"`, `"info"`, `"debug"` or `"trace"`.
    #[serde(default)]
    pub level: Option<String>,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("download_manager.log")
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: None,
        }
    }
}

/// Validated, resolved settings used by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub links_file: PathBuf,
    pub download_dir: PathBuf,
    pub executable: String,
    pub debounce_window: Duration,
    pub shutdown_timeout: Duration,
    pub open_editor: bool,
    pub close_editors_on_exit: bool,
    pub editors: Vec<String>,
    pub log_file: PathBuf,
    pub log_level: Option<LogLevel>,
}

/// Initial contents of a freshly created links file.
pub const LINKS_FILE_TEMPLATE: &str = "# Add your links here (one per line)\n";
