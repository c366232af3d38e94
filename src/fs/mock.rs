// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for tests.
///
/// Paths are used verbatim as keys; no normalisation happens. Individual
/// paths can be marked as failing to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    failing: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock_entries().insert(PathBuf::from("."), MockEntry::Dir);
        fs
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.lock_entries();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    /// Append to a file, creating it if missing.
    pub fn append(&self, path: impl AsRef<Path>, content: &[u8]) {
        let path = path.as_ref();
        let mut current = match self.lock_entries().get(path) {
            Some(MockEntry::File(bytes)) => bytes.clone(),
            _ => Vec::new(),
        };
        current.extend_from_slice(content);
        self.add_file(path, current);
    }

    /// Make every operation on `path` fail from now on.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.failing
            .lock()
            .expect("mock fs poisoned")
            .insert(path.as_ref().to_path_buf());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.lock_entries().get(path.as_ref()) {
            Some(MockEntry::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.lock().expect("mock fs poisoned")
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.lock().expect("mock fs poisoned").contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if path.as_os_str().is_empty() {
            return;
        }
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.check(path)?;
        match self.lock_entries().get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.check(path)?;
        self.add_file(path, contents);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.check(path)?;
        let mut entries = self.lock_entries();
        if let Some(MockEntry::File(_)) = entries.get(path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        Self::ensure_dirs(&mut entries, path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock_entries().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock_entries().get(path), Some(MockEntry::Dir))
    }
}
