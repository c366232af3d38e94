#![allow(dead_code)]

use std::path::Path;

use ariawatch::config::{RawConfigFile, Settings};

/// Builder for `Settings` rooted in a test directory.
///
/// Defaults differ from production in one way: no editor is opened and no
/// editor processes are closed, so tests never touch the desktop.
pub struct SettingsBuilder {
    config: RawConfigFile,
}

impl SettingsBuilder {
    pub fn new(root: &Path) -> Self {
        let mut config = RawConfigFile::default();
        config.watch.links_file = root.join("links.txt");
        config.download.dir = root.join("downloads");
        config.lifecycle.open_editor = false;
        config.lifecycle.close_editors_on_exit = false;
        Self { config }
    }

    pub fn links_file(mut self, path: &Path) -> Self {
        self.config.watch.links_file = path.to_path_buf();
        self
    }

    pub fn download_dir(mut self, path: &Path) -> Self {
        self.config.download.dir = path.to_path_buf();
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.watch.debounce_ms = ms;
        self
    }

    pub fn shutdown_timeout_secs(mut self, secs: u64) -> Self {
        self.config.lifecycle.shutdown_timeout_secs = secs;
        self
    }

    pub fn close_editors(mut self, editors: &[&str]) -> Self {
        self.config.lifecycle.close_editors_on_exit = true;
        self.config.lifecycle.editors = Some(editors.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.config).expect("Failed to build valid settings from builder")
    }
}
