use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// The single file being watched.
///
/// Matching against watcher events is done by *file name* only, so moving
/// the working directory around does not break matching. The full path is
/// kept for reading the file and for the downloader's `--input-file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    path: PathBuf,
    file_name: String,
}

impl WatchTarget {
    /// Build a target from the path of the links file.
    ///
    /// Returns `None` if the path has no file name component (e.g. `..`).
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, file_name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Directory the watcher should observe (the file's parent, or `.`).
    pub fn watch_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// True if `candidate` refers to a file with the same name as the target.
    pub fn matches(&self, candidate: &Path) -> bool {
        candidate.file_name() == Some(OsStr::new(&self.file_name))
    }
}

/// Why a dispatch attempt could not read what it needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreadableCause {
    /// The links file could not be opened or decoded.
    LinksFile(String),
    /// The downloader executable was not found on `PATH`.
    MissingExecutable(String),
}

/// Synchronous answer of [`Dispatcher::try_dispatch`].
///
/// The download outcome itself is reported later, asynchronously.
///
/// [`Dispatcher::try_dispatch`]: crate::engine::Dispatcher::try_dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Started,
    SkippedAlreadyRunning,
    SkippedNoContent,
    SkippedUnreadable(UnreadableCause),
}

impl DispatchResult {
    pub fn is_started(&self) -> bool {
        matches!(self, DispatchResult::Started)
    }
}

/// Exit code aria2c uses for I/O errors (disk full, permission denied...).
pub const EXIT_CODE_IO_ERROR: i32 = 28;

/// Classified result of one downloader run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    PartialIoError,
    OtherNonZero(i32),
    LaunchFailure(String),
}

impl ProcessOutcome {
    /// Classify a process exit code.
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => ProcessOutcome::Success,
            EXIT_CODE_IO_ERROR => ProcessOutcome::PartialIoError,
            other => ProcessOutcome::OtherNonZero(other),
        }
    }

    /// Classify what a launcher returned: an exit code or a launch error.
    pub fn from_launch(result: anyhow::Result<i32>) -> Self {
        match result {
            Ok(code) => Self::from_exit_code(code),
            Err(err) => ProcessOutcome::LaunchFailure(format!("{err:#}")),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }

    /// The exit code, if the process got far enough to have one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessOutcome::Success => Some(0),
            ProcessOutcome::PartialIoError => Some(EXIT_CODE_IO_ERROR),
            ProcessOutcome::OtherNonZero(code) => Some(*code),
            ProcessOutcome::LaunchFailure(_) => None,
        }
    }

    /// One-line human summary, including the hint for recognised codes.
    pub fn summary(&self) -> String {
        match self {
            ProcessOutcome::Success => "aria2c: all downloads completed successfully".to_string(),
            ProcessOutcome::PartialIoError => format!(
                "aria2c exited with code {EXIT_CODE_IO_ERROR} (I/O error); check disk space and folder permissions"
            ),
            ProcessOutcome::OtherNonZero(code) => {
                format!("aria2c exited with code {code}; check the output above for details")
            }
            ProcessOutcome::LaunchFailure(err) => {
                format!("failed to run aria2c: {err}")
            }
        }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// States of the file-change orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Stopped,
    Watching,
    Stopping,
}
