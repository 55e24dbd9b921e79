// src/engine/runtime.rs

use std::fmt;

use tracing::{debug, info};

use crate::errors::{FatalError, ReloadrError, Result};
use crate::types::Stage;
use crate::watch::{ChangeStream, ErrorStream, Watch, WatcherHandle};

use super::{ChangeHandler, ShutdownCause, ShutdownSignal, Trigger};

/// The orchestrator loop.
///
/// Runs one startup cycle, then handles accepted changes one at a time on
/// this task. A cycle (build and kill) blocks the loop; notifications that
/// arrive meanwhile wait in the change stream and are debounced when the
/// loop resumes. Watch errors and the shutdown signal end the loop.
pub struct Runtime<H: ChangeHandler> {
    handler: H,
    changes: ChangeStream,
    errors: ErrorStream,
    shutdown: ShutdownSignal,
    watcher: Option<WatcherHandle>,
}

impl<H: ChangeHandler> fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("changes", &self.changes)
            .field("shutdown", &self.shutdown)
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl<H: ChangeHandler> Runtime<H> {
    pub fn new(
        handler: H,
        changes: ChangeStream,
        errors: ErrorStream,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            handler,
            changes,
            errors,
            shutdown,
            watcher: None,
        }
    }

    /// Runtime over a started watch; keeps the backend alive until `run`
    /// returns.
    pub fn from_watch(handler: H, watch: Watch, shutdown: ShutdownSignal) -> Self {
        let mut runtime = Self::new(handler, watch.changes, watch.errors, shutdown);
        runtime.watcher = Some(watch.handle);
        runtime
    }

    /// Main loop.
    ///
    /// Returns `Ok(())` after an interrupt or when the watch backend goes
    /// away, and `Err(ReloadrError::Fatal)` naming the failed stage when a
    /// fatal condition fired the shutdown signal.
    pub async fn run(mut self) -> Result<()> {
        info!("reloadr runtime started");

        if !self.shutdown.is_fired() {
            self.dispatch(Trigger::Startup).await;
        }

        while !self.shutdown.is_fired() {
            tokio::select! {
                biased;

                _ = self.shutdown.fired() => break,

                Some(err) = self.errors.recv() => {
                    let fatal = FatalError::new(Stage::Watch, err.to_string());
                    self.handler.on_error(&fatal);
                    self.shutdown.fire_fatal(fatal);
                }

                change = self.changes.next() => match change {
                    Some(event) => self.dispatch(Trigger::Change(event)).await,
                    None => {
                        info!("change stream closed; exiting");
                        break;
                    }
                },
            }
        }

        self.handler.shutdown().await;
        drop(self.watcher.take());

        info!("runtime exiting");
        match self.shutdown.cause() {
            Some(ShutdownCause::Fatal(fatal)) => Err(ReloadrError::Fatal(fatal.clone())),
            _ => Ok(()),
        }
    }

    async fn dispatch(&mut self, trigger: Trigger) {
        debug!(?trigger, "dispatching trigger");
        if let Err(fatal) = self.handler.on_change(trigger, &self.shutdown).await {
            self.shutdown.fire_fatal(fatal);
        }
    }
}
