// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) behind the
//!   [`WatchBackend`] trait.
//! - Turning raw watcher events into [`ChangeEvent`]s.
//! - Debouncing bursts of events for the links file ([`DebounceGate`]).
//!
//! It does **not** know about downloads; it only turns filesystem changes
//! into events for the orchestrator.

pub mod debounce;
pub mod events;
pub mod watcher;

pub use debounce::{DebounceGate, DEFAULT_DEBOUNCE_WINDOW};
pub use events::{ChangeEvent, ChangeKind};
pub use watcher::{EventSender, NotifyWatchBackend, WatchBackend};
