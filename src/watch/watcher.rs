// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::watch::events::ChangeEvent;

/// Channel the watcher pushes change events into.
pub type EventSender = mpsc::UnboundedSender<ChangeEvent>;

/// A source of filesystem change events for one directory.
///
/// Production uses [`NotifyWatchBackend`]; tests drive the orchestrator with
/// a backend that lets them emit synthetic events.
pub trait WatchBackend: Send {
    /// Start emitting events for entries of `dir` (non-recursive).
    fn watch(&mut self, dir: &Path, events: EventSender) -> Result<()>;

    /// Stop emitting events. After this returns no further events are sent
    /// and the backend has dropped its sender.
    fn unwatch(&mut self);
}

/// Cross-platform watcher built on `notify`'s recommended backend.
#[derive(Default)]
pub struct NotifyWatchBackend {
    inner: Option<(RecommendedWatcher, PathBuf)>,
}

impl std::fmt::Debug for NotifyWatchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatchBackend")
            .field("watching", &self.inner.as_ref().map(|(_, dir)| dir))
            .finish()
    }
}

impl NotifyWatchBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchBackend for NotifyWatchBackend {
    fn watch(&mut self, dir: &Path, events: EventSender) -> Result<()> {
        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let at = Instant::now();
                    for change in ChangeEvent::from_notify(&event, at) {
                        if events.send(change).is_err() {
                            // Receiver gone: the orchestrator has stopped.
                            return;
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            },
            Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!(?dir, "file watcher started");

        self.inner = Some((watcher, dir.to_path_buf()));
        Ok(())
    }

    fn unwatch(&mut self) {
        if let Some((mut watcher, dir)) = self.inner.take() {
            if let Err(err) = watcher.unwatch(&dir) {
                debug!(?dir, error = %err, "unwatch failed; dropping watcher anyway");
            }
            drop(watcher);
            info!(?dir, "file watcher stopped");
        }
    }
}
