// src/engine/mod.rs

//! Orchestration engine for ariawatch.
//!
//! This module ties together:
//! - the single-flight download dispatcher
//! - the file-change orchestrator that reacts to watcher events
//! - the lifecycle manager that sequences start-up and shutdown
//!
//! The per-event decision logic is synchronous
//! ([`Orchestrator::handle_event`], [`Dispatcher::try_dispatch`]); the async
//! shell only moves events between channels and tasks.

pub mod dispatcher;
pub mod lifecycle;
pub mod orchestrator;

pub use dispatcher::{Dispatcher, RunSlot, RunState};
pub use lifecycle::{check_once_outcome, LifecycleManager, RunningApp, StopReport};
pub use orchestrator::{EventDecision, IgnoreReason, Orchestrator};
pub use crate::types::OrchestratorState;
