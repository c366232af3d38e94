// src/engine/dispatcher.rs

//! Single-flight download dispatcher.
//!
//! At most one downloader process runs at a time. The run-state flag lives
//! behind a mutex owned by the dispatcher; the only way to flip it to
//! `Running` is [`Dispatcher::try_dispatch`], and the only way back to
//! `Idle` is dropping the [`RunSlot`] guard that call hands to the
//! background task.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::anyhow;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::console;
use crate::errors::Result;
use crate::exec::{DownloadInvocation, ProcessLauncher};
use crate::fs::{has_link_lines, FileSystem};
use crate::types::{
    DispatchResult, ProcessOutcome, UnreadableCause, WatchTarget, EXIT_CODE_IO_ERROR,
};

/// Whether a download is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

#[derive(Debug)]
struct RunFlag {
    state: Mutex<RunState>,
}

impl RunFlag {
    fn lock(&self) -> MutexGuard<'_, RunState> {
        // Plain enum: a poisoned lock holds no torn state.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Test-and-set: `Idle -> Running` under the lock.
    fn try_claim(self: &Arc<Self>) -> Option<RunSlot> {
        let mut state = self.lock();
        match *state {
            RunState::Running => None,
            RunState::Idle => {
                *state = RunState::Running;
                Some(RunSlot {
                    flag: Arc::clone(self),
                })
            }
        }
    }
}

/// Ownership of the single download slot.
///
/// Dropping it returns the dispatcher to `Idle`, whichever way the holder
/// exits: normal completion, early return, error or panic.
#[derive(Debug)]
pub struct RunSlot {
    flag: Arc<RunFlag>,
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        *self.flag.lock() = RunState::Idle;
    }
}

type OutcomeSubscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<ProcessOutcome>>>>;

/// Decides whether a trigger starts a download, and runs it in the
/// background when it does.
pub struct Dispatcher {
    target: WatchTarget,
    download_dir: PathBuf,
    fs: Arc<dyn FileSystem>,
    launcher: Arc<dyn ProcessLauncher>,
    flag: Arc<RunFlag>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    subscribers: OutcomeSubscribers,
    runtime: Handle,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("target", &self.target)
            .field("download_dir", &self.download_dir)
            .field("state", &*self.flag.lock())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher for `target`.
    ///
    /// Must be called from within a Tokio runtime: background downloads are
    /// spawned on the runtime that was current at construction, so
    /// [`try_dispatch`](Self::try_dispatch) itself may be called from any
    /// thread.
    pub fn new(
        target: WatchTarget,
        download_dir: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow!("dispatcher requires a tokio runtime: {e}"))?;
        Ok(Self {
            target,
            download_dir: download_dir.into(),
            fs,
            launcher,
            flag: Arc::new(RunFlag {
                state: Mutex::new(RunState::Idle),
            }),
            in_flight: Mutex::new(None),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            runtime,
        })
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn state(&self) -> RunState {
        *self.flag.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Receive every [`ProcessOutcome`] from now on.
    ///
    /// The outcome is published after the dispatcher is back to `Idle`.
    pub fn subscribe_outcomes(&self) -> mpsc::UnboundedReceiver<ProcessOutcome> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock_or_recover(&self.subscribers).push(tx);
        rx
    }

    /// Evaluate one trigger.
    ///
    /// Returns immediately; when the result is `Started` the download runs
    /// in a detached background task and its outcome is only reported via
    /// console, logs and [`subscribe_outcomes`](Self::subscribe_outcomes).
    pub fn try_dispatch(&self) -> DispatchResult {
        let Some(slot) = self.flag.try_claim() else {
            info!(file = %self.target.file_name(), "download already in progress; skipping trigger");
            console::warn("Download already in progress, skipping...");
            return DispatchResult::SkippedAlreadyRunning;
        };

        // Every early return below drops `slot`, which resets the state.
        let contents = match self.fs.read_to_string(self.target.path()) {
            Ok(contents) => contents,
            Err(err) => {
                let cause = format!("{err:#}");
                error!(path = ?self.target.path(), error = %cause, "failed to read links file");
                console::error(format!("Cannot read {}: {cause}", self.target.file_name()));
                return DispatchResult::SkippedUnreadable(UnreadableCause::LinksFile(cause));
            }
        };

        if !has_link_lines(&contents) {
            debug!(path = ?self.target.path(), "links file has no link lines");
            console::warn("No links found in file (only comments or empty lines)");
            return DispatchResult::SkippedNoContent;
        }

        let Some(program) = self.launcher.locate() else {
            let name = self.launcher.name().to_string();
            error!(executable = %name, "downloader executable not found in PATH");
            console::error(format!(
                "{name} executable not found in PATH. Install aria2 or place it in a PATH directory."
            ));
            return DispatchResult::SkippedUnreadable(UnreadableCause::MissingExecutable(name));
        };

        let invocation =
            DownloadInvocation::aria2(program, &self.download_dir, self.target.path());
        info!(cmd = %invocation.display(), "dispatching download");

        let handle = self.runtime.spawn(run_in_background(
            slot,
            Arc::clone(&self.launcher),
            invocation,
            Arc::clone(&self.subscribers),
        ));
        *lock_or_recover(&self.in_flight) = Some(handle);

        DispatchResult::Started
    }

    /// Wait for the in-flight download (if any) to finish, at most `timeout`.
    ///
    /// Returns `true` if nothing is running afterwards. On timeout the task
    /// keeps running detached; the child process is never killed here.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let handle = lock_or_recover(&self.in_flight).take();
        let Some(handle) = handle else {
            return !self.is_running();
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => true,
            Ok(Err(join_err)) => {
                error!(error = %join_err, "download task ended abnormally");
                !self.is_running()
            }
            Err(_) => {
                warn!(?timeout, "download still running after timeout; leaving it detached");
                false
            }
        }
    }
}

/// Body of the detached download task.
async fn run_in_background(
    slot: RunSlot,
    launcher: Arc<dyn ProcessLauncher>,
    invocation: DownloadInvocation,
    subscribers: OutcomeSubscribers,
) {
    console::download_starting();

    // Run the launcher in its own task so a panic inside it surfaces as a
    // `JoinError` instead of tearing down this task before we report.
    let launch = tokio::spawn(async move { launcher.launch(invocation).await });
    let outcome = match launch.await {
        Ok(result) => ProcessOutcome::from_launch(result),
        Err(join_err) => ProcessOutcome::LaunchFailure(format!("launcher task failed: {join_err}")),
    };

    drop(slot);
    report_outcome(&outcome);

    lock_or_recover(&subscribers).retain(|tx| tx.send(outcome.clone()).is_ok());
}

fn report_outcome(outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Success => info!(exit_code = 0, "{}", outcome.summary()),
        ProcessOutcome::PartialIoError => {
            warn!(exit_code = EXIT_CODE_IO_ERROR, "{}", outcome.summary())
        }
        ProcessOutcome::OtherNonZero(code) => warn!(exit_code = *code, "{}", outcome.summary()),
        ProcessOutcome::LaunchFailure(_) => error!("{}", outcome.summary()),
    }
    console::outcome(outcome);
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
