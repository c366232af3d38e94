// src/logging.rs

//! Logging setup for `ariawatch` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `ARIAWATCH_LOG` environment variable (e.g. "info", "debug")
//! 3. `[logging].level` from the config file
//! 4. default to `warn`
//!
//! Logs are written to a single, never-rotated file (`download_manager.log`
//! by default) so the terminal stays free for aria2c's own progress output.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise the global logging subscriber.
///
/// Call once at startup. Keep the returned guard alive until the process
/// exits; dropping it flushes buffered log lines.
pub fn init_logging(
    cli_level: Option<LogLevel>,
    config_level: Option<LogLevel>,
    file: &Path,
) -> Result<WorkerGuard> {
    let level = resolve_level(cli_level, config_level);

    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = file
        .file_name()
        .with_context(|| format!("log file path {:?} has no file name", file))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("cannot open log file {:?}", file))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(guard)
}

fn resolve_level(cli_level: Option<LogLevel>, config_level: Option<LogLevel>) -> tracing::Level {
    cli_level
        .or_else(|| {
            std::env::var("ARIAWATCH_LOG")
                .ok()
                .and_then(|s| s.parse::<LogLevel>().ok())
        })
        .or(config_level)
        .map(level_from_log_level)
        .unwrap_or(tracing::Level::WARN)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}
