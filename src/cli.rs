// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `ariawatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "ariawatch",
    version,
    about = "Watch a links file and hand it to aria2c whenever it is saved.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to an optional config file (TOML).
    ///
    /// If omitted, `Ariawatch.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Links file to watch (one URI per line, `#` comments allowed).
    #[arg(long, value_name = "PATH")]
    pub links_file: Option<PathBuf>,

    /// Directory aria2c downloads into.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Minimum time between two saves for them to trigger separate runs.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Don't open the links file in an editor at startup.
    #[arg(long)]
    pub no_editor: bool,

    /// Don't terminate editor processes on exit.
    #[arg(long)]
    pub keep_editors: bool,

    /// Download whatever is in the links file once, then exit (no watching).
    #[arg(long)]
    pub once: bool,

    /// Resolve configuration and print the aria2c command, but run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ARIAWATCH_LOG`, the config file, or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI and in the config file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
