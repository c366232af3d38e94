use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ariawatch::errors::{AriawatchError, Result};
use ariawatch::watch::{ChangeEvent, EventSender, WatchBackend};

#[derive(Debug, Default)]
struct Shared {
    sender: Option<EventSender>,
    watched: Option<PathBuf>,
    unwatched: bool,
}

/// A watch backend driven by the test instead of the OS.
///
/// Clone it before handing it to the lifecycle manager; the clone kept by
/// the test can then [`emit`](Self::emit) synthetic events.
#[derive(Debug, Clone, Default)]
pub struct ManualWatchBackend {
    shared: Arc<Mutex<Shared>>,
    fail_to_start: bool,
}

impl ManualWatchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// `watch()` will fail, like a watcher that cannot be started.
    pub fn failing() -> Self {
        Self {
            shared: Arc::default(),
            fail_to_start: true,
        }
    }

    /// Send an event; returns false if nobody is listening any more.
    pub fn emit(&self, event: ChangeEvent) -> bool {
        match &self.shared.lock().unwrap().sender {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Emit a modify event for `path` at `at`.
    pub fn emit_modified(&self, path: impl Into<PathBuf>, at: Instant) -> bool {
        self.emit(ChangeEvent::modified(path, at))
    }

    pub fn watched_dir(&self) -> Option<PathBuf> {
        self.shared.lock().unwrap().watched.clone()
    }

    pub fn was_unwatched(&self) -> bool {
        self.shared.lock().unwrap().unwatched
    }
}

impl WatchBackend for ManualWatchBackend {
    fn watch(&mut self, dir: &Path, events: EventSender) -> Result<()> {
        if self.fail_to_start {
            return Err(AriawatchError::Other(anyhow::anyhow!(
                "cannot watch {:?}",
                dir
            )));
        }
        let mut shared = self.shared.lock().unwrap();
        shared.sender = Some(events);
        shared.watched = Some(dir.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self) {
        let mut shared = self.shared.lock().unwrap();
        shared.sender = None;
        shared.unwatched = true;
    }
}
