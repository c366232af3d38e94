// src/engine/lifecycle.rs

//! Start-up and shutdown sequencing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{Settings, LINKS_FILE_TEMPLATE};
use crate::console;
use crate::engine::orchestrator::{EventDecision, Orchestrator};
use crate::engine::Dispatcher;
use crate::errors::{AriawatchError, Result};
use crate::exec::{open_in_editor, ProcessLauncher};
use crate::fs::FileSystem;
use crate::procs::{close_editor_processes, ProcessLister};
use crate::types::{DispatchResult, OrchestratorState, ProcessOutcome, WatchTarget};
use crate::watch::{DebounceGate, WatchBackend};

/// Owns the collaborators until the app is started.
pub struct LifecycleManager {
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    dispatcher: Arc<Dispatcher>,
    lister: Box<dyn ProcessLister>,
    decisions: Option<mpsc::UnboundedSender<EventDecision>>,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("settings", &self.settings)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl LifecycleManager {
    /// Must be called from within a Tokio runtime (see [`Dispatcher::new`]).
    pub fn new(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        launcher: Arc<dyn ProcessLauncher>,
        lister: Box<dyn ProcessLister>,
    ) -> Result<Self> {
        let target = WatchTarget::new(&settings.links_file).ok_or_else(|| {
            AriawatchError::ConfigError(format!(
                "links file {:?} has no file name",
                settings.links_file
            ))
        })?;
        let dispatcher = Arc::new(Dispatcher::new(
            target,
            settings.download_dir.clone(),
            Arc::clone(&fs),
            launcher,
        )?);

        Ok(Self {
            settings,
            fs,
            dispatcher,
            lister,
            decisions: None,
        })
    }

    /// Forward the orchestrator's per-event decisions to `tx`.
    pub fn with_decisions(mut self, tx: mpsc::UnboundedSender<EventDecision>) -> Self {
        self.decisions = Some(tx);
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Make sure the download directory and the links file exist, then open
    /// the links file in an editor if configured. Only the first two steps
    /// are fatal.
    pub fn prepare(&self) -> Result<()> {
        self.ensure_download_dir()?;
        self.ensure_links_file()?;

        if self.settings.open_editor {
            let path = self.dispatcher.target().path();
            console::info(format!("Opening {}...", self.dispatcher.target().file_name()));
            if let Err(err) = open_in_editor(path) {
                let cause = format!("{err:#}");
                warn!(?path, error = %cause, "failed to open links file in editor");
                console::warn(format!("Failed to open file automatically: {cause}"));
                console::warn(format!("Open manually: {}", path.display()));
            }
        }
        Ok(())
    }

    fn ensure_download_dir(&self) -> Result<()> {
        let dir = &self.settings.download_dir;
        self.fs
            .create_dir_all(dir)
            .map_err(|source| AriawatchError::DownloadDir {
                path: dir.clone(),
                source,
            })?;
        info!(?dir, "download directory ready");
        console::ok(format!("Verified download directory: {}", dir.display()));
        Ok(())
    }

    fn ensure_links_file(&self) -> Result<()> {
        let path = self.dispatcher.target().path();
        if self.fs.is_dir(path) {
            return Err(AriawatchError::LinksFile {
                path: path.to_path_buf(),
                source: anyhow::anyhow!("path is a directory"),
            });
        }
        if self.fs.exists(path) {
            return Ok(());
        }

        self.fs
            .write(path, LINKS_FILE_TEMPLATE.as_bytes())
            .map_err(|source| AriawatchError::LinksFile {
                path: path.to_path_buf(),
                source,
            })?;
        warn!(?path, "created new links file");
        Ok(())
    }

    /// Start-up sequence: prepare → initial dispatch → start watching.
    ///
    /// If the watcher cannot be started, editor cleanup still runs before the
    /// error is returned.
    pub async fn start<B>(self, mut backend: B) -> Result<RunningApp>
    where
        B: WatchBackend + 'static,
    {
        self.prepare()?;

        let initial = self.dispatcher.try_dispatch();
        info!(?initial, "initial dispatch");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watch_dir = self.dispatcher.target().watch_dir();
        if let Err(err) = backend.watch(&watch_dir, event_tx) {
            error!(dir = ?watch_dir, error = %err, "failed to start file watcher");
            console::error(format!("Failed to start file monitoring: {err}"));
            if self.settings.close_editors_on_exit {
                close_editors_off_runtime(self.lister, self.settings.editors).await;
            }
            return Err(err);
        }

        let mut orchestrator = Orchestrator::new(
            DebounceGate::new(self.settings.debounce_window),
            Arc::clone(&self.dispatcher),
        );
        if let Some(tx) = self.decisions {
            orchestrator = orchestrator.with_decisions(tx);
        }
        let state = orchestrator.subscribe_state();

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(orchestrator.run(event_rx, stop_rx));

        Ok(RunningApp {
            settings: self.settings,
            dispatcher: self.dispatcher,
            lister: self.lister,
            backend: Box::new(backend),
            stop_tx,
            task,
            state,
            initial,
        })
    }

    /// One-shot mode: prepare, dispatch once, wait for the download.
    ///
    /// Returns the outcome, or `None` if nothing was started.
    pub async fn run_once(self) -> Result<Option<ProcessOutcome>> {
        self.prepare()?;

        let mut outcomes = self.dispatcher.subscribe_outcomes();
        match self.dispatcher.try_dispatch() {
            DispatchResult::Started => Ok(outcomes.recv().await),
            other => {
                info!(result = ?other, "nothing to download");
                Ok(None)
            }
        }
    }
}

/// Turn a one-shot result into the process result: nothing to download is
/// fine, a download that did not fully succeed is an error.
pub fn check_once_outcome(outcome: Option<ProcessOutcome>) -> Result<()> {
    match outcome {
        None | Some(ProcessOutcome::Success) => Ok(()),
        Some(failed) => Err(AriawatchError::DownloadFailed(failed)),
    }
}

/// What happened during shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// The orchestrator reached `Stopped` within the timeout.
    pub orchestrator_stopped: bool,
    /// No download was left running.
    pub download_settled: bool,
    pub editors_closed: usize,
}

/// A started application: the watcher is live and the orchestrator running.
pub struct RunningApp {
    settings: Settings,
    dispatcher: Arc<Dispatcher>,
    lister: Box<dyn ProcessLister>,
    backend: Box<dyn WatchBackend>,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
    state: watch::Receiver<OrchestratorState>,
    initial: DispatchResult,
}

impl std::fmt::Debug for RunningApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningApp")
            .field("state", &*self.state.borrow())
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

impl RunningApp {
    /// Result of the unconditional dispatch made during start-up.
    pub fn initial_dispatch(&self) -> &DispatchResult {
        &self.initial
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Shutdown sequence.
    ///
    /// Stops the watcher and the orchestrator, waits (bounded) for an
    /// in-flight download, then closes known editors. Never fails; problems
    /// are logged and reflected in the report.
    pub async fn stop(self) -> StopReport {
        let timeout = self.settings.shutdown_timeout;
        let mut backend = self.backend;

        backend.unwatch();
        let _ = self.stop_tx.send(());
        let orchestrator_stopped = await_task(self.task, timeout).await;
        if !orchestrator_stopped {
            warn!(?timeout, "orchestrator did not stop in time");
        }

        let download_settled = self.dispatcher.wait_idle(timeout).await;

        let editors_closed = if self.settings.close_editors_on_exit {
            close_editors_off_runtime(self.lister, self.settings.editors).await
        } else {
            0
        };

        if editors_closed > 0 {
            console::ok(format!("Closed {editors_closed} editor process(es) on exit."));
        }

        StopReport {
            orchestrator_stopped,
            download_settled,
            editors_closed,
        }
    }
}

/// Editor termination sleeps while waiting for processes to exit, so it
/// runs on the blocking pool.
async fn close_editors_off_runtime(mut lister: Box<dyn ProcessLister>, editors: Vec<String>) -> usize {
    match tokio::task::spawn_blocking(move || close_editor_processes(lister.as_mut(), &editors))
        .await
    {
        Ok(closed) => closed,
        Err(err) => {
            error!(error = %err, "editor cleanup task failed");
            0
        }
    }
}

async fn await_task(task: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            error!(error = %err, "orchestrator task failed");
            false
        }
        Err(_) => false,
    }
}
