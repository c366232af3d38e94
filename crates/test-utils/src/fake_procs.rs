use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use ariawatch::procs::{ProcessInfo, ProcessLister};

/// A fake process table.
///
/// `terminate` removes the process and records its pid; pids registered
/// with [`fail_on`](Self::fail_on) refuse to die. With
/// [`with_terminate_delay`](Self::with_terminate_delay) each call blocks the
/// calling thread first, like a real graceful shutdown wait.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessLister {
    processes: Arc<Mutex<Vec<ProcessInfo>>>,
    failing: Arc<Mutex<HashSet<u32>>>,
    terminated: Arc<Mutex<Vec<u32>>>,
    delay: Duration,
}

impl FakeProcessLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(self, pid: u32, name: &str) -> Self {
        self.processes.lock().unwrap().push(ProcessInfo {
            pid,
            name: name.to_string(),
        });
        self
    }

    pub fn fail_on(self, pid: u32) -> Self {
        self.failing.lock().unwrap().insert(pid);
        self
    }

    pub fn with_terminate_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> Vec<ProcessInfo> {
        self.processes.lock().unwrap().clone()
    }
}

impl ProcessLister for FakeProcessLister {
    fn list_processes(&mut self) -> Vec<ProcessInfo> {
        self.processes.lock().unwrap().clone()
    }

    fn terminate(&mut self, pid: u32) -> anyhow::Result<()> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.failing.lock().unwrap().contains(&pid) {
            return Err(anyhow!("access denied for pid {pid}"));
        }
        self.processes.lock().unwrap().retain(|p| p.pid != pid);
        self.terminated.lock().unwrap().push(pid);
        Ok(())
    }
}
