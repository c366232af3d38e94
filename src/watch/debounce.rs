// src/watch/debounce.rs

//! Debounce gate for change events on the watched file.
//!
//! Editors commonly emit several modify events for one logical save. The
//! gate lets the first one through and swallows the rest until `window` has
//! elapsed since the last *accepted* event.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Leading-edge debounce over event timestamps.
///
/// Owned by the single event-processing task, so it needs no locking.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// Accept `now` iff at least `window` has passed since the last accepted
    /// timestamp (or nothing was accepted yet). Rejections leave the state
    /// untouched.
    pub fn accept(&mut self, now: Instant) -> bool {
        let fresh = match self.last_accepted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if fresh {
            self.last_accepted = Some(now);
        }
        fresh
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
