// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the downloader, using
//! `tokio::process::Command`, and for opening the links file in an editor.
//!
//! - [`command`] builds the aria2c command line.
//! - [`task_runner`] runs one downloader process and returns its exit code.
//! - [`backend`] provides the `ProcessLauncher` trait and the concrete
//!   `Aria2Launcher` the dispatcher uses in production, and which tests can
//!   replace with a fake implementation.
//! - [`editor`] opens the links file with the platform's default handler.

pub mod backend;
pub mod command;
pub mod editor;
pub mod task_runner;

pub use backend::{Aria2Launcher, LaunchFuture, ProcessLauncher};
pub use command::DownloadInvocation;
pub use editor::open_in_editor;
