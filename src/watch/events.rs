// src/watch/events.rs

//! Backend-neutral change events.

use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind, RenameMode};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Other,
}

/// A single path-level change, timestamped on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub is_dir: bool,
    pub at: Instant,
}

impl ChangeEvent {
    /// A file modification at `at` (handy for synthetic events).
    pub fn modified(path: impl Into<PathBuf>, at: Instant) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Modified,
            is_dir: false,
            at,
        }
    }

    /// True for kinds that may change the file's contents.
    pub fn is_content_change(&self) -> bool {
        matches!(self.kind, ChangeKind::Created | ChangeKind::Modified)
    }

    /// Split a `notify` event into one `ChangeEvent` per path.
    ///
    /// Renames are split by side: the path a file was moved *away from* is
    /// reported as `Removed`, the path it was moved *to* as `Modified`. With
    /// `RenameMode::Both` the paths are `[from, to]`. When the backend can't
    /// tell which side a path is on (`RenameMode::Any`), a path that no
    /// longer exists is taken as the source.
    ///
    /// `notify` does not always say whether a path is a directory, so we
    /// fall back to asking the filesystem.
    pub fn from_notify(event: &notify::Event, at: Instant) -> Vec<Self> {
        let kind_says_dir = matches!(
            event.kind,
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder)
        );

        event
            .paths
            .iter()
            .enumerate()
            .map(|(index, path)| Self {
                path: path.clone(),
                kind: classify(&event.kind, index, path),
                is_dir: kind_says_dir || is_existing_dir(path),
                at,
            })
            .collect()
    }
}

fn classify(kind: &EventKind, index: usize, path: &Path) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        // Metadata-only changes don't touch the contents.
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Other,
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => ChangeKind::Removed,
            RenameMode::To => ChangeKind::Modified,
            RenameMode::Both if index == 0 => ChangeKind::Removed,
            RenameMode::Both => ChangeKind::Modified,
            _ if path.exists() => ChangeKind::Modified,
            _ => ChangeKind::Removed,
        },
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => ChangeKind::Other,
    }
}

fn is_existing_dir(path: &Path) -> bool {
    path.is_dir()
}
