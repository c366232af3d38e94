use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::Notify;
use ariawatch::exec::{DownloadInvocation, LaunchFuture, ProcessLauncher};

/// What a [`FakeLauncher`] run does.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Exit with this code.
    Exit(i32),
    /// Fail to launch with this message.
    Fail(String),
    /// Panic inside the launch future.
    Panic,
}

/// A fake launcher that:
/// - records every invocation it was asked to run
/// - optionally waits for a delay or an explicit release before finishing
/// - then exits with a configurable code, error, or panic.
#[derive(Clone)]
pub struct FakeLauncher {
    behaviour: Arc<Mutex<FakeBehaviour>>,
    delay: Arc<Mutex<Duration>>,
    gate: Option<Arc<Notify>>,
    installed: bool,
    invocations: Arc<Mutex<Vec<DownloadInvocation>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn exiting_with(code: i32) -> Self {
        Self::with_behaviour(FakeBehaviour::Exit(code))
    }

    pub fn failing(msg: &str) -> Self {
        Self::with_behaviour(FakeBehaviour::Fail(msg.to_string()))
    }

    pub fn panicking() -> Self {
        Self::with_behaviour(FakeBehaviour::Panic)
    }

    pub fn with_behaviour(behaviour: FakeBehaviour) -> Self {
        Self {
            behaviour: Arc::new(Mutex::new(behaviour)),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            gate: None,
            installed: true,
            invocations: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `locate()` returns `None`, as if aria2c were not installed.
    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self
    }

    /// Sleep this long before finishing each run.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    /// Block each run until [`release`](Self::release) is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one gated run finish.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn set_behaviour(&self, behaviour: FakeBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn invocations(&self) -> Vec<DownloadInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Highest number of runs that were in progress at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl ProcessLauncher for FakeLauncher {
    fn name(&self) -> &str {
        "fake-aria2c"
    }

    fn locate(&self) -> Option<PathBuf> {
        self.installed.then(|| PathBuf::from("/usr/bin/fake-aria2c"))
    }

    fn launch(&self, invocation: DownloadInvocation) -> LaunchFuture {
        self.invocations.lock().unwrap().push(invocation);

        let behaviour = self.behaviour.lock().unwrap().clone();
        let delay = *self.delay.lock().unwrap();
        let gate = self.gate.clone();
        let active = Arc::clone(&self.active);
        let max_active = Arc::clone(&self.max_active);

        Box::pin(async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = gate {
                gate.notified().await;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            active.fetch_sub(1, Ordering::SeqCst);

            match behaviour {
                FakeBehaviour::Exit(code) => Ok(code),
                FakeBehaviour::Fail(msg) => Err(anyhow!(msg)),
                FakeBehaviour::Panic => panic!("fake launcher panicked"),
            }
        })
    }
}
