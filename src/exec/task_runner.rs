// src/exec/task_runner.rs

//! Runs a single downloader process to completion.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{info, warn};

use crate::exec::command::DownloadInvocation;

/// Run the downloader and wait for it to exit.
///
/// stdout/stderr are inherited so the child's progress output reaches the
/// console unmodified. Returns the exit code; a child killed by a signal has
/// no code and is reported as `-1`.
pub async fn run_download(invocation: DownloadInvocation) -> Result<i32> {
    info!(cmd = %invocation.display(), "starting downloader process");

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {:?}", invocation.program))?;

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for {:?}", invocation.program))?;

    let code = match status.code() {
        Some(code) => code,
        None => {
            warn!(?status, "downloader terminated without an exit code");
            -1
        }
    };

    info!(exit_code = code, success = status.success(), "downloader process exited");
    Ok(code)
}
