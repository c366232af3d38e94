// src/procs/mod.rs

//! Best-effort cleanup of editor processes on shutdown.
//!
//! The OS side is behind [`ProcessLister`]; the core only needs a process
//! list, a name predicate and a termination call.

pub mod sysinfo_lister;

use anyhow::Result;
use tracing::{debug, info, warn};

pub use sysinfo_lister::SysinfoProcessLister;

/// A running process as seen by the lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Capability to enumerate and terminate OS processes.
pub trait ProcessLister: Send {
    fn list_processes(&mut self) -> Vec<ProcessInfo>;
    fn terminate(&mut self, pid: u32) -> Result<()>;
}

/// Editors closed on shutdown for the current platform.
pub fn default_editor_names() -> Vec<String> {
    let names: &[&str] = if cfg!(windows) {
        &["notepad", "wordpad"]
    } else if cfg!(target_os = "macos") {
        &["TextEdit", "BBEdit", "Sublime Text", "code"]
    } else {
        &["gedit", "kate", "nano", "vi", "vim"]
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// True if `process_name` is one of `editors`.
///
/// Comparison is case-insensitive and ignores a trailing `.exe`.
pub fn is_editor(process_name: &str, editors: &[String]) -> bool {
    let name = normalize(process_name);
    editors.iter().any(|editor| normalize(editor) == name)
}

fn normalize(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Terminate every process whose name is in `editors`.
///
/// Failures for individual processes are logged and skipped. Returns the
/// number of processes that were terminated.
pub fn close_editor_processes(lister: &mut dyn ProcessLister, editors: &[String]) -> usize {
    if editors.is_empty() {
        return 0;
    }

    let mut closed = 0;
    for process in lister.list_processes() {
        if !is_editor(&process.name, editors) {
            continue;
        }
        match lister.terminate(process.pid) {
            Ok(()) => {
                debug!(pid = process.pid, name = %process.name, "terminated editor process");
                closed += 1;
            }
            Err(err) => {
                warn!(
                    pid = process.pid,
                    name = %process.name,
                    error = %err,
                    "failed to terminate editor process"
                );
            }
        }
    }

    if closed > 0 {
        info!(closed, "closed editor processes on exit");
    }
    closed
}
