// src/exec/command.rs

//! Building the downloader command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A fully resolved downloader invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl DownloadInvocation {
    /// aria2c invocation: resume partial downloads, write into
    /// `download_dir`, read URIs from `links_file`.
    pub fn aria2(program: PathBuf, download_dir: &Path, links_file: &Path) -> Self {
        let args = vec![
            OsString::from("--continue=true"),
            flag_with_path("--dir=", download_dir),
            flag_with_path("--input-file=", links_file),
        ];
        Self { program, args }
    }

    /// Command line as a single display string (for logs and `--dry-run`).
    pub fn display(&self) -> String {
        let mut out = self.program.display().to_string();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

fn flag_with_path(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}

/// Platform-specific executable name for a downloader base name.
pub fn executable_name(base: &str) -> String {
    if cfg!(windows) && !base.to_ascii_lowercase().ends_with(".exe") {
        format!("{base}.exe")
    } else {
        base.to_string()
    }
}
