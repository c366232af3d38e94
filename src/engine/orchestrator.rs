// src/engine/orchestrator.rs

//! File-change orchestrator.
//!
//! Consumes [`ChangeEvent`]s for the watched directory, drops everything
//! that isn't a content change of the links file, runs the rest through the
//! [`DebounceGate`], and hands accepted triggers to the [`Dispatcher`].
//!
//! The per-event logic lives in [`Orchestrator::handle_event`], which is
//! synchronous and never blocks; [`Orchestrator::run`] is the async shell
//! that reads from channels and drives the state machine
//! `Stopped → Watching → Stopping → Stopped`.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::console;
use crate::engine::Dispatcher;
use crate::types::{DispatchResult, OrchestratorState, WatchTarget};
use crate::watch::{ChangeEvent, DebounceGate};

/// Why an event never reached the debounce gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Directory,
    OtherFile,
    NotAContentChange,
}

/// What the orchestrator did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    Ignored(IgnoreReason),
    Debounced,
    Dispatched(DispatchResult),
}

pub struct Orchestrator {
    target: WatchTarget,
    gate: DebounceGate,
    dispatcher: Arc<Dispatcher>,
    state: watch::Sender<OrchestratorState>,
    decisions: Option<mpsc::UnboundedSender<EventDecision>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("target", &self.target)
            .field("gate", &self.gate)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(gate: DebounceGate, dispatcher: Arc<Dispatcher>) -> Self {
        let (state, _) = watch::channel(OrchestratorState::Stopped);
        Self {
            target: dispatcher.target().clone(),
            gate,
            dispatcher,
            state,
            decisions: None,
        }
    }

    /// Publish every [`EventDecision`] to `tx`.
    pub fn with_decisions(mut self, tx: mpsc::UnboundedSender<EventDecision>) -> Self {
        self.decisions = Some(tx);
        self
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    /// Observe state transitions, including the final `Stopped` after
    /// [`run`](Self::run) has consumed the orchestrator.
    pub fn subscribe_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Handle a single change event.
    pub fn handle_event(&mut self, event: ChangeEvent) -> EventDecision {
        if event.is_dir {
            return EventDecision::Ignored(IgnoreReason::Directory);
        }
        if !self.target.matches(&event.path) {
            return EventDecision::Ignored(IgnoreReason::OtherFile);
        }
        if !event.is_content_change() {
            debug!(path = ?event.path, kind = ?event.kind, "ignoring non-content event");
            return EventDecision::Ignored(IgnoreReason::NotAContentChange);
        }

        if !self.gate.accept(event.at) {
            debug!(path = ?event.path, "change debounced");
            return EventDecision::Debounced;
        }

        info!(path = ?event.path, "links file changed; dispatching");
        console::change_detected(self.target.file_name());
        EventDecision::Dispatched(self.dispatcher.try_dispatch())
    }

    /// Main event loop.
    ///
    /// Runs until `stop` fires (or its sender is dropped) or the event
    /// channel closes. Events still buffered when stopping are discarded.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ChangeEvent>,
        mut stop: oneshot::Receiver<()>,
    ) {
        self.set_state(OrchestratorState::Watching);
        info!(file = %self.target.file_name(), "orchestrator watching");

        loop {
            tokio::select! {
                biased;

                _ = &mut stop => {
                    debug!("stop requested");
                    break;
                }

                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        info!("event channel closed");
                        break;
                    };
                    let decision = self.handle_event(event);
                    debug!(?decision, "event handled");
                    if let Some(tx) = &self.decisions {
                        let _ = tx.send(decision);
                    }
                }
            }
        }

        self.set_state(OrchestratorState::Stopping);
        events.close();
        let mut discarded = 0usize;
        while events.recv().await.is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!(discarded, "dropped events received while stopping");
        }

        self.set_state(OrchestratorState::Stopped);
        info!("orchestrator stopped");
    }

    fn set_state(&self, next: OrchestratorState) {
        self.state.send_replace(next);
    }
}
