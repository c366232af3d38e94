// src/exec/backend.rs

//! Pluggable process launcher abstraction.
//!
//! The dispatcher talks to a `ProcessLauncher` instead of spawning processes
//! itself. This makes it easy to swap in a fake launcher in tests (with a
//! configurable delay, exit code, or error) while keeping the production
//! implementation in [`Aria2Launcher`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Mutex;

use anyhow::Result;
use tracing::debug;

use super::command::{executable_name, DownloadInvocation};
use super::task_runner::run_download;

/// Future returned by [`ProcessLauncher::launch`].
///
/// Resolves to the child's exit code, or an error if it could not be run.
pub type LaunchFuture = Pin<Box<dyn Future<Output = Result<i32>> + Send + 'static>>;

/// Trait abstracting how the downloader is found and run.
pub trait ProcessLauncher: Send + Sync {
    /// Executable name, for messages.
    fn name(&self) -> &str;

    /// Resolve the downloader executable, or `None` if it is not installed.
    fn locate(&self) -> Option<PathBuf>;

    /// Run the downloader until it exits.
    ///
    /// The returned future must always complete; it is awaited from a
    /// background task, never from the event loop.
    fn launch(&self, invocation: DownloadInvocation) -> LaunchFuture;
}

/// Real launcher: finds `aria2c` on `PATH` and runs it with inherited stdio.
#[derive(Debug)]
pub struct Aria2Launcher {
    executable: String,
    resolved: Mutex<Option<PathBuf>>,
}

impl Aria2Launcher {
    /// `executable` is a base name (`"aria2c"`) or an explicit path.
    pub fn new(executable: impl AsRef<str>) -> Self {
        Self {
            executable: executable_name(executable.as_ref()),
            resolved: Mutex::new(None),
        }
    }
}

impl ProcessLauncher for Aria2Launcher {
    fn name(&self) -> &str {
        &self.executable
    }

    fn locate(&self) -> Option<PathBuf> {
        let mut cached = match self.resolved.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(path) = cached.as_ref() {
            return Some(path.clone());
        }

        // Only successful lookups are cached so installing aria2 while we
        // are running is picked up on the next save.
        match which::which(&self.executable) {
            Ok(path) => {
                debug!(?path, "resolved downloader executable");
                *cached = Some(path.clone());
                Some(path)
            }
            Err(err) => {
                debug!(executable = %self.executable, error = %err, "downloader not found");
                None
            }
        }
    }

    fn launch(&self, invocation: DownloadInvocation) -> LaunchFuture {
        Box::pin(run_download(invocation))
    }
}
