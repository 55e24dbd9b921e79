// src/engine/mod.rs

//! Orchestration engine for reloadr.
//!
//! This module ties together:
//! - the pure cycle state machine ([`core`]): build, kill, start/skip
//! - the production change handler that drives the builder and the
//!   supervisor through that machine ([`reloader`])
//! - the main loop that reacts to accepted changes, watch errors and the
//!   shutdown signal ([`runtime`])
//! - the shutdown signal itself ([`shutdown`])

use crate::errors::FatalError;
use crate::exec::BoxFuture;
use crate::watch::ChangeEvent;

pub mod core;
pub mod reloader;
pub mod runtime;
pub mod shutdown;

pub use self::core::{CycleCommand, CycleInput, CycleMachine, CycleOutcome, CycleState};
pub use reloader::Reloader;
pub use runtime::Runtime;
pub use shutdown::{ShutdownCause, ShutdownSignal};

/// Why an orchestration cycle runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The unconditional initial build + run.
    Startup,
    Change(ChangeEvent),
}

/// What the runtime calls for every trigger and watch error.
///
/// Production code uses [`Reloader`]; tests can provide an implementation
/// that only records what it observed.
pub trait ChangeHandler: Send {
    /// Handle one trigger to completion. `Err` is fatal: the runtime fires
    /// the shutdown signal with it.
    ///
    /// `shutdown` lets long-running handlers notice a shutdown that fired
    /// while they were busy.
    fn on_change<'a>(
        &'a mut self,
        trigger: Trigger,
        shutdown: &'a ShutdownSignal,
    ) -> BoxFuture<'a, Result<(), FatalError>>;

    /// The watch backend failed. Called once, right before shutdown fires.
    fn on_error(&mut self, error: &FatalError);

    /// The runtime loop is unwinding; release anything still running.
    fn shutdown(&mut self) -> BoxFuture<'_, ()>;
}
