// src/procs/sysinfo_lister.rs

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

use super::{ProcessInfo, ProcessLister};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// [`ProcessLister`] backed by `sysinfo`.
///
/// `terminate` asks politely first (SIGTERM where supported), waits up to
/// `grace` for the process to go away, then kills it.
pub struct SysinfoProcessLister {
    system: System,
    grace: Duration,
}

impl std::fmt::Debug for SysinfoProcessLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProcessLister")
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

impl SysinfoProcessLister {
    pub fn new(grace: Duration) -> Self {
        Self {
            system: System::new(),
            grace,
        }
    }

    fn refresh_one(&mut self, pid: Pid) -> bool {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system.process(pid).is_some()
    }
}

impl Default for SysinfoProcessLister {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ProcessLister for SysinfoProcessLister {
    fn list_processes(&mut self) -> Vec<ProcessInfo> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        self.system
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn terminate(&mut self, pid: u32) -> Result<()> {
        let pid = Pid::from_u32(pid);
        let process = self
            .system
            .process(pid)
            .ok_or_else(|| anyhow!("process {pid} no longer exists"))?;

        // `None` means SIGTERM is not supported on this platform.
        let graceful = process.kill_with(Signal::Term).unwrap_or(false);
        if graceful {
            let deadline = Instant::now() + self.grace;
            while Instant::now() < deadline {
                if !self.refresh_one(pid) {
                    return Ok(());
                }
                thread::sleep(POLL_INTERVAL);
            }
        }

        match self.system.process(pid) {
            Some(process) => {
                if process.kill() {
                    Ok(())
                } else {
                    Err(anyhow!("failed to kill process {pid}"))
                }
            }
            None => Ok(()),
        }
    }
}
