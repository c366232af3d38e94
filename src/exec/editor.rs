// src/exec/editor.rs

//! Opening the links file in the platform's default editor.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Open `path` with the desktop's default handler.
///
/// Uses `cmd /C start` on Windows, `open` on macOS and `xdg-open` elsewhere.
/// The opener is spawned and not waited for; the editor outlives this call.
pub fn open_in_editor(path: &Path) -> Result<()> {
    let mut cmd = opener_command(path)?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    debug!(?cmd, "launching editor");
    cmd.spawn()
        .with_context(|| format!("launching editor for {:?}", path))?;
    Ok(())
}

fn opener_command(path: &Path) -> Result<Command> {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        // The empty string is the window title `start` expects first.
        c.arg("/C").arg("start").arg("").arg(path);
        Ok(c)
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        Ok(c)
    } else {
        let opener = which::which("xdg-open")
            .map_err(|_| anyhow!("no xdg-open found; open {:?} manually", path))?;
        let mut c = Command::new(opener);
        c.arg(path);
        Ok(c)
    }
}
